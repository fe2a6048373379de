use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use shared::{Quest, QuestType};

/// 9999-12-31T23:59:59Z, the expiry stored on quests that never reset
pub const NEVER_EXPIRES_TIMESTAMP: i64 = 253_402_300_799;

/// Expiry sentinel for epic quests
pub fn never_expires() -> DateTime<Utc> {
    DateTime::from_timestamp(NEVER_EXPIRES_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Midnight UTC at the start of the given date
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// End of the window that contains `now` for the given quest type.
/// Returns `None` for epic quests, which have no window.
pub fn next_expiry(quest_type: QuestType, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();

    match quest_type {
        QuestType::Daily => Some(start_of_day(today + Duration::days(1))),
        QuestType::Weekly => {
            // Weeks start on Monday; a Monday `now` rolls a full week ahead
            let days_until_monday = 7 - today.weekday().num_days_from_monday() as i64;
            Some(start_of_day(today + Duration::days(days_until_monday)))
        }
        QuestType::Epic => None,
    }
}

/// Bring a quest's tracking window up to date with `now`.
///
/// Lapsed daily/weekly quests are reset to zero progress with the claim
/// cleared and a fresh expiry. Epic quests only get their expiry pinned to
/// [`never_expires`]. Returns whether the quest was modified.
pub fn ensure_current(quest: &mut Quest, now: DateTime<Utc>) -> bool {
    let Some(expiry) = next_expiry(quest.quest_type, now) else {
        let never = never_expires();
        if quest.expires_at == never {
            return false;
        }
        quest.expires_at = never;
        return true;
    };

    if quest.expires_at > now {
        return false;
    }

    log::debug!(
        "Resetting {} quest {} (expired {}, next expiry {})",
        quest.quest_type.as_str(),
        quest.id,
        quest.expires_at,
        expiry
    );

    quest.progress = 0;
    quest.reward_claimed = false;
    quest.expires_at = expiry;
    true
}
