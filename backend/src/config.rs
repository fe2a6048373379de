use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("GOLD_THRESHOLD ({gold}) must not be below SILVER_THRESHOLD ({silver})")]
    InvalidThresholds { silver: i64, gold: i64 },
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Tier boundaries on the lifetime completed-sprint count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingThresholds {
    /// Completed sprints needed for Silver (T1)
    pub silver: i64,
    /// Completed sprints needed for Gold (T2)
    pub gold: i64,
}

/// Upper bound for `STREAK_LOOKBACK_DAYS`, roughly a century
pub const MAX_STREAK_LOOKBACK_DAYS: i64 = 36_500;
/// Upper bound for `ROLLOVER_GRACE_SECONDS`, one day
pub const MAX_ROLLOVER_GRACE_SECONDS: u64 = 86_400;

pub const DEFAULT_SILVER_THRESHOLD: i64 = 20;
pub const DEFAULT_GOLD_THRESHOLD: i64 = 50;

impl Default for StandingThresholds {
    fn default() -> Self {
        Self {
            silver: DEFAULT_SILVER_THRESHOLD,
            gold: DEFAULT_GOLD_THRESHOLD,
        }
    }
}

/// Tunables consumed by the quest, standing and streak calculations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestConfig {
    /// Sprints per day needed for the day to count towards the streak.
    /// Also the goal of the daily quest.
    pub daily_goal_threshold: i64,
    pub weekly_goal: i64,
    pub epic_goal: i64,
    pub standing: StandingThresholds,
    /// How many days of history are fetched when computing the streak
    pub streak_lookback_days: i64,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            daily_goal_threshold: 4,
            weekly_goal: 20,
            epic_goal: 100,
            standing: StandingThresholds::default(),
            streak_lookback_days: 365,
        }
    }
}

impl QuestConfig {
    /// Goal used for a quest type that has not been seeded yet
    pub fn fallback_goal(&self, quest_type: shared::QuestType) -> i64 {
        match quest_type {
            shared::QuestType::Daily => self.daily_goal_threshold,
            shared::QuestType::Weekly => self.weekly_goal,
            shared::QuestType::Epic => self.epic_goal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub quest: QuestConfig,
    /// Seconds to wait past midnight UTC before the rollover job runs
    pub rollover_grace_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = QuestConfig::default();

        let standing = StandingThresholds {
            silver: parse_var("SILVER_THRESHOLD", defaults.standing.silver)?,
            gold: parse_var("GOLD_THRESHOLD", defaults.standing.gold)?,
        };
        if standing.gold < standing.silver {
            return Err(ConfigError::InvalidThresholds {
                silver: standing.silver,
                gold: standing.gold,
            });
        }

        let streak_lookback_days =
            parse_var("STREAK_LOOKBACK_DAYS", defaults.streak_lookback_days)?;
        if !(1..=MAX_STREAK_LOOKBACK_DAYS).contains(&streak_lookback_days) {
            return Err(ConfigError::OutOfRange {
                name: "STREAK_LOOKBACK_DAYS",
                value: streak_lookback_days,
                min: 1,
                max: MAX_STREAK_LOOKBACK_DAYS,
            });
        }

        // Parsed signed so a negative value is reported as out of range
        let rollover_grace_seconds: i64 = parse_var("ROLLOVER_GRACE_SECONDS", 5)?;
        if !(0..=MAX_ROLLOVER_GRACE_SECONDS as i64).contains(&rollover_grace_seconds) {
            return Err(ConfigError::OutOfRange {
                name: "ROLLOVER_GRACE_SECONDS",
                value: rollover_grace_seconds,
                min: 0,
                max: MAX_ROLLOVER_GRACE_SECONDS as i64,
            });
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:sprintquest.db?mode=rwc".to_string()),
            quest: QuestConfig {
                daily_goal_threshold: parse_var("DAILY_GOAL_THRESHOLD", defaults.daily_goal_threshold)?,
                weekly_goal: parse_var("WEEKLY_GOAL", defaults.weekly_goal)?,
                epic_goal: parse_var("EPIC_GOAL", defaults.epic_goal)?,
                standing,
                streak_lookback_days,
            },
            rollover_grace_seconds: rollover_grace_seconds as u64,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
