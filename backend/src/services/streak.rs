use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Group completion timestamps by their UTC calendar day
pub fn bucket_by_day<I>(completed_at: I) -> HashMap<NaiveDate, i64>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut buckets = HashMap::new();
    for timestamp in completed_at {
        *buckets.entry(timestamp.date_naive()).or_insert(0) += 1;
    }
    buckets
}

/// Count consecutive qualifying days ending at `today`.
///
/// A day qualifies when it has at least `daily_threshold` completions. The
/// walk starts at `today` itself, so an unfinished today yields 0 even if
/// yesterday qualified.
pub fn calculate_streak(
    counts_by_day: &HashMap<NaiveDate, i64>,
    today: NaiveDate,
    daily_threshold: i64,
) -> i32 {
    let mut streak = 0;
    let mut cursor = today;

    while counts_by_day
        .get(&cursor)
        .is_some_and(|count| *count >= daily_threshold)
    {
        streak += 1;
        cursor = match cursor.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }

    streak
}
