use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Quest Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Daily,
    Weekly,
    Epic,
}

impl QuestType {
    /// All quest types in display order
    pub const ALL: [QuestType; 3] = [QuestType::Daily, QuestType::Weekly, QuestType::Epic];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestType::Daily => "daily",
            QuestType::Weekly => "weekly",
            QuestType::Epic => "epic",
        }
    }

    /// Daily and weekly quests never store progress above their goal
    pub fn is_capped(&self) -> bool {
        !matches!(self, QuestType::Epic)
    }
}

impl FromStr for QuestType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(QuestType::Daily),
            "weekly" => Ok(QuestType::Weekly),
            "epic" => Ok(QuestType::Epic),
            _ => Err(()),
        }
    }
}

/// A tracked goal instance for one quest type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: Uuid,
    pub name: String,
    pub quest_type: QuestType,
    pub goal: i64,
    pub progress: i64,
    pub reward: Option<String>,
    /// End of the current tracking window. Epic quests carry the "never" sentinel.
    pub expires_at: DateTime<Utc>,
    pub reward_claimed: bool,
    /// Row version used for optimistic concurrency, bumped on every save
    #[serde(default)]
    pub version: i64,
}

impl Quest {
    pub fn is_completed(&self) -> bool {
        self.progress >= self.goal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub goal: i64,
    pub completed: i64,
}

/// Per-type quest progress as reported on the stats page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSnapshot {
    pub daily: QuestProgress,
    pub weekly: QuestProgress,
    pub epic: QuestProgress,
}

// ============================================================================
// Standing Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Standing {
    Bronze,
    Silver,
    Gold,
}

impl Standing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Bronze => "Bronze",
            Standing::Silver => "Silver",
            Standing::Gold => "Gold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandingProgress {
    pub standing: Standing,
    /// None once the highest tier is reached
    pub next_threshold: Option<i64>,
    /// Fraction of the way to the next tier, in [0, 1]
    pub percent_to_next: f64,
}

// ============================================================================
// Progress Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    pub standing: Standing,
    pub next_threshold: Option<i64>,
    pub percent_to_next: f64,
    pub total_completed: i64,
    pub streak_days: i32,
    pub quests: QuestSnapshot,
}

impl ProgressView {
    /// Percent to next tier on a 0-100 scale for display
    pub fn percent_display(&self) -> f64 {
        self.percent_to_next * 100.0
    }
}

// ============================================================================
// Sprint Types
// ============================================================================

/// A finished focus sprint as reported by the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintCompletion {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: i64,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================
