use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::MAX_ROLLOVER_GRACE_SECONDS;
use crate::db::{QuestStore, StoreError};
use crate::services::quest_reset;

/// Report from refreshing quest windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverReport {
    pub processed_at: DateTime<Utc>,
    pub quests_checked: i64,
    pub quests_reset: i64,
}

/// Next midnight UTC after `now`, plus the grace period
pub fn next_run_at(now: DateTime<Utc>, grace: Duration) -> DateTime<Utc> {
    let midnight = (now.date_naive() + Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc();
    midnight + grace
}

/// Delay past midnight, capped at one day
pub fn grace_period(grace_seconds: u64) -> Duration {
    Duration::seconds(grace_seconds.min(MAX_ROLLOVER_GRACE_SECONDS) as i64)
}

/// Start the rollover scheduler
/// This runs in a loop and refreshes lapsed quest windows after every UTC midnight
pub async fn start_rollover_scheduler<S, C>(store: Arc<S>, clock: C, grace_seconds: u64)
where
    S: QuestStore + ?Sized,
    C: Clock,
{
    let grace = grace_period(grace_seconds);
    log::info!(
        "Quest rollover scheduler started, running {}s after midnight UTC",
        grace_seconds
    );

    loop {
        let now = clock.now_utc();
        let next = next_run_at(now, grace);
        let sleep_duration = (next - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(3600));

        log::debug!("Next quest rollover in {} seconds", sleep_duration.as_secs());

        clock.sleep(sleep_duration).await;

        match rollover_quests(store.as_ref(), &clock).await {
            Ok(report) => {
                log::info!(
                    "Quest rollover complete: checked {} quests, reset {}",
                    report.quests_checked,
                    report.quests_reset
                );
            }
            Err(e) => {
                log::error!("Error rolling over quests: {}", e);
            }
        }
    }
}

/// Refresh every stored quest through the reset policy and persist the ones
/// that changed. Quests modified concurrently are left to their writer.
pub async fn rollover_quests<S, C>(store: &S, clock: &C) -> Result<RolloverReport, StoreError>
where
    S: QuestStore + ?Sized,
    C: Clock,
{
    let now = clock.now_utc();
    let quests = store.get_all().await?;

    let mut quests_checked: i64 = 0;
    let mut quests_reset: i64 = 0;

    for mut quest in quests {
        quests_checked += 1;

        if !quest_reset::ensure_current(&mut quest, now) {
            continue;
        }

        match store.save(&quest).await {
            Ok(_) => quests_reset += 1,
            Err(StoreError::Conflict { id }) => {
                log::warn!("Quest {} modified during rollover, skipping", id);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(RolloverReport {
        processed_at: now,
        quests_checked,
        quests_reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::QuestConfig;
    use crate::db::sqlite::memory_store;
    use crate::services::quests;
    use chrono::TimeZone;
    use shared::QuestType;

    #[test]
    fn test_next_run_at() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 10, 0, 0).unwrap();
        assert_eq!(
            next_run_at(now, Duration::seconds(5)),
            Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 5).unwrap()
        );

        // Exactly at midnight the next run is a day away
        let midnight = Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap();
        assert_eq!(
            next_run_at(midnight, Duration::zero()),
            Utc.with_ymd_and_hms(2024, 1, 19, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_grace_period_is_capped() {
        assert_eq!(grace_period(0), Duration::zero());
        assert_eq!(grace_period(5), Duration::seconds(5));
        assert_eq!(grace_period(86_400), Duration::days(1));
        assert_eq!(grace_period(u64::MAX), Duration::days(1));
    }

    #[tokio::test]
    async fn test_rollover_resets_lapsed_quests() {
        let store = memory_store().await;
        let seeded_at = FixedClock(Utc.with_ymd_and_hms(2024, 1, 17, 10, 0, 0).unwrap());
        quests::seed_default_quests(&store, &seeded_at, &QuestConfig::default())
            .await
            .unwrap();

        // Nothing to do on the same day
        let report = rollover_quests(&store, &seeded_at).await.unwrap();
        assert_eq!(report.quests_checked, 3);
        assert_eq!(report.quests_reset, 0);

        // Next Monday both the daily and weekly windows have lapsed
        let monday = FixedClock(Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 5).unwrap());
        let report = rollover_quests(&store, &monday).await.unwrap();
        assert_eq!(report.quests_checked, 3);
        assert_eq!(report.quests_reset, 2);
        assert_eq!(report.processed_at, monday.0);

        let weekly = store.get_by_type(QuestType::Weekly).await.unwrap().unwrap();
        assert_eq!(weekly.expires_at, Utc.with_ymd_and_hms(2024, 1, 29, 0, 0, 0).unwrap());
    }
}
