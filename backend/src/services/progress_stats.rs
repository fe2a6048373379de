use chrono::{DateTime, Duration, NaiveDate, Utc};
use shared::{ProgressView, Quest, QuestProgress, QuestSnapshot, QuestType};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::QuestConfig;
use crate::db::{QuestStore, SprintHistoryStore, StoreError};
use crate::services::{quest_reset, standing, streak};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Assembled progress plus the quests whose window was refreshed on the way
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub view: ProgressView,
    /// Ids of quests changed by the reset policy; the caller must persist them
    pub modified: Vec<Uuid>,
}

/// Build the progress view from already fetched inputs.
///
/// `quests` are refreshed in place through the reset policy so the snapshot
/// reflects the current windows. A quest type with no stored quest reports
/// its configured goal and zero progress.
pub fn assemble(
    config: &QuestConfig,
    total_completed: i64,
    day_buckets: &HashMap<NaiveDate, i64>,
    today: NaiveDate,
    now: DateTime<Utc>,
    quests: &mut [Quest],
) -> ProgressReport {
    let standing = standing::calculate_standing(total_completed, config.standing);
    let streak_days = streak::calculate_streak(day_buckets, today, config.daily_goal_threshold);

    let mut modified = Vec::new();
    let mut snapshot_for = |quest_type: QuestType| -> QuestProgress {
        match quests.iter_mut().find(|q| q.quest_type == quest_type) {
            Some(quest) => {
                if quest_reset::ensure_current(quest, now) {
                    modified.push(quest.id);
                }
                QuestProgress {
                    goal: quest.goal,
                    completed: quest.progress,
                }
            }
            None => QuestProgress {
                goal: config.fallback_goal(quest_type),
                completed: 0,
            },
        }
    };

    let quests = QuestSnapshot {
        daily: snapshot_for(QuestType::Daily),
        weekly: snapshot_for(QuestType::Weekly),
        epic: snapshot_for(QuestType::Epic),
    };

    ProgressReport {
        view: ProgressView {
            standing: standing.standing,
            next_threshold: standing.next_threshold,
            percent_to_next: standing.percent_to_next,
            total_completed,
            streak_days,
            quests,
        },
        modified,
    }
}

/// Days of history `[from, to_exclusive)` the streak can reach from `today`.
/// Lookbacks reaching past the calendar start at [`NaiveDate::MIN`].
pub fn lookback_window(today: NaiveDate, lookback_days: i64) -> (NaiveDate, NaiveDate) {
    // Streak walks backwards from today, so only the lookback window matters
    let lookback = lookback_days.max(1);
    let from = Duration::try_days(lookback - 1)
        .and_then(|span| today.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);
    let to_exclusive = today.succ_opt().unwrap_or(NaiveDate::MAX);

    (from, to_exclusive)
}

/// Fetch history and quests, assemble the progress view and persist any
/// quest the reset policy refreshed.
pub async fn get_progress<Q, H, C>(
    quest_store: &Q,
    history: &H,
    clock: &C,
    config: &QuestConfig,
) -> Result<ProgressView, ProgressError>
where
    Q: QuestStore + ?Sized,
    H: SprintHistoryStore + ?Sized,
    C: Clock,
{
    let now = clock.now_utc();
    let today = now.date_naive();

    let (from, to_exclusive) = lookback_window(today, config.streak_lookback_days);

    let total_completed = history.count_total_completed().await?;
    let day_buckets = history.count_completions_by_day(from, to_exclusive).await?;
    let mut quests = quest_store.get_all().await?;

    let report = assemble(config, total_completed, &day_buckets, today, now, &mut quests);

    for id in &report.modified {
        let Some(quest) = quests.iter().find(|q| q.id == *id) else {
            continue;
        };
        match quest_store.save(quest).await {
            Ok(_) => log::debug!("Persisted refreshed {} quest {}", quest.quest_type.as_str(), id),
            // Another writer refreshed or advanced it already
            Err(StoreError::Conflict { .. }) => {
                log::warn!("Skipped persisting refreshed quest {}: modified concurrently", id);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report.view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::StandingThresholds;
    use crate::db::sqlite::memory_store;
    use chrono::TimeZone;
    use shared::{SprintCompletion, Standing};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 17, 10, 0, 0).unwrap()
    }

    fn config() -> QuestConfig {
        QuestConfig {
            daily_goal_threshold: 3,
            weekly_goal: 20,
            epic_goal: 100,
            standing: StandingThresholds { silver: 20, gold: 50 },
            streak_lookback_days: 30,
        }
    }

    fn quest(quest_type: QuestType, goal: i64, progress: i64, expires_at: DateTime<Utc>) -> Quest {
        Quest {
            id: Uuid::new_v4(),
            name: format!("{} quest", quest_type.as_str()),
            quest_type,
            goal,
            progress,
            reward: None,
            expires_at,
            reward_claimed: false,
            version: 0,
        }
    }

    #[test]
    fn test_assemble_combines_calculators() {
        let today = now().date_naive();
        let buckets: HashMap<NaiveDate, i64> = [
            (today, 3),
            (today - Duration::days(1), 3),
            (today - Duration::days(2), 2),
        ]
        .into_iter()
        .collect();
        let mut quests = vec![
            quest(QuestType::Daily, 3, 2, Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap()),
            quest(QuestType::Weekly, 20, 11, Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap()),
            quest(QuestType::Epic, 100, 25, quest_reset::never_expires()),
        ];

        let report = assemble(&config(), 25, &buckets, today, now(), &mut quests);

        assert!(report.modified.is_empty());
        assert_eq!(report.view.standing, Standing::Silver);
        assert_eq!(report.view.next_threshold, Some(50));
        assert!((report.view.percent_to_next - 0.1667).abs() < 1e-4);
        assert_eq!(report.view.total_completed, 25);
        assert_eq!(report.view.streak_days, 2);
        assert_eq!(report.view.quests.daily, QuestProgress { goal: 3, completed: 2 });
        assert_eq!(report.view.quests.weekly, QuestProgress { goal: 20, completed: 11 });
        assert_eq!(report.view.quests.epic, QuestProgress { goal: 100, completed: 25 });
    }

    #[test]
    fn test_assemble_reports_lapsed_quests() {
        let today = now().date_naive();
        let mut quests = vec![
            quest(QuestType::Daily, 3, 3, Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap()),
            quest(QuestType::Weekly, 20, 11, Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap()),
        ];
        let daily_id = quests[0].id;

        let report = assemble(&config(), 0, &HashMap::new(), today, now(), &mut quests);

        assert_eq!(report.modified, vec![daily_id]);
        assert_eq!(report.view.quests.daily, QuestProgress { goal: 3, completed: 0 });
        assert_eq!(quests[0].progress, 0);
        assert_eq!(quests[0].expires_at, Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_assemble_missing_quests_use_fallback_goals() {
        let today = now().date_naive();

        let report = assemble(&config(), 0, &HashMap::new(), today, now(), &mut []);

        assert_eq!(report.view.standing, Standing::Bronze);
        assert_eq!(report.view.percent_to_next, 0.0);
        assert_eq!(report.view.streak_days, 0);
        assert_eq!(report.view.quests.daily, QuestProgress { goal: 3, completed: 0 });
        assert_eq!(report.view.quests.weekly, QuestProgress { goal: 20, completed: 0 });
        assert_eq!(report.view.quests.epic, QuestProgress { goal: 100, completed: 0 });
        assert!(report.modified.is_empty());
    }

    #[test]
    fn test_lookback_window() {
        let today = now().date_naive();
        let tomorrow = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();

        assert_eq!(lookback_window(today, 1), (today, tomorrow));
        assert_eq!(
            lookback_window(today, 30),
            (NaiveDate::from_ymd_opt(2023, 12, 19).unwrap(), tomorrow)
        );
        // Non-positive lookbacks still cover today
        assert_eq!(lookback_window(today, 0), (today, tomorrow));
        // Reaching past the calendar start clamps instead of overflowing
        assert_eq!(lookback_window(today, 100_000_000), (NaiveDate::MIN, tomorrow));
        assert_eq!(lookback_window(today, i64::MAX), (NaiveDate::MIN, tomorrow));
    }

    #[tokio::test]
    async fn test_get_progress_with_huge_lookback() {
        let store = memory_store().await;
        let clock = FixedClock(now());
        let mut config = config();
        config.streak_lookback_days = 100_000_000;

        for hour in [7, 8, 9] {
            let completion = SprintCompletion {
                id: Uuid::new_v4(),
                project_id: None,
                completed_at: Utc.with_ymd_and_hms(2024, 1, 17, hour, 0, 0).unwrap(),
                duration_minutes: 25,
            };
            store.record_completion(&completion).await.unwrap();
        }

        let view = get_progress(&store, &store, &clock, &config).await.unwrap();

        assert_eq!(view.total_completed, 3);
        assert_eq!(view.streak_days, 1);
    }

    #[tokio::test]
    async fn test_get_progress_persists_resets() {
        let store = memory_store().await;
        let clock = FixedClock(now());
        let stale = quest(QuestType::Daily, 3, 3, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        store.insert(&stale).await.unwrap();

        for hour in [8, 9, 10] {
            let completion = SprintCompletion {
                id: Uuid::new_v4(),
                project_id: None,
                completed_at: Utc.with_ymd_and_hms(2024, 1, 17, hour, 0, 0).unwrap(),
                duration_minutes: 25,
            };
            store.record_completion(&completion).await.unwrap();
        }

        let view = get_progress(&store, &store, &clock, &config()).await.unwrap();

        assert_eq!(view.total_completed, 3);
        assert_eq!(view.streak_days, 1);
        assert_eq!(view.quests.daily.completed, 0);

        let stored = store.get(&stale.id).await.unwrap().unwrap();
        assert_eq!(stored.progress, 0);
        assert_eq!(stored.version, 1);
        assert_eq!(stored.expires_at, Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap());
    }
}
