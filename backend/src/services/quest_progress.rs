use chrono::{DateTime, Utc};
use shared::{ApiError, Quest, QuestType};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{QuestStore, StoreError};
use crate::services::quest_reset;

/// Read-modify-write attempts before giving up on a contended quest
pub const MAX_SAVE_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("Quest not found")]
    NotFound,
    #[error("Quest not yet completed")]
    NotCompleted,
    #[error("Reward already claimed")]
    AlreadyClaimed,
    #[error("Quest was modified concurrently, try again")]
    Conflict,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl QuestError {
    /// Whether the calling layer should answer with a conflict status
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            QuestError::NotCompleted | QuestError::AlreadyClaimed | QuestError::Conflict
        )
    }

    pub fn to_api_error(&self) -> ApiError {
        let error = match self {
            QuestError::NotFound => "not_found",
            QuestError::NotCompleted => "not_completed",
            QuestError::AlreadyClaimed => "already_claimed",
            QuestError::Conflict => "conflict",
            QuestError::Store(_) => "internal_error",
        };
        let message = match self {
            // Keep database details out of client-facing messages
            QuestError::Store(_) => "Failed to update quest".to_string(),
            other => other.to_string(),
        };

        ApiError {
            error: error.to_string(),
            message,
        }
    }
}

/// Add `amount` to a quest's progress within its current window.
///
/// Daily and weekly quests are capped at their goal; epic quests grow
/// without bound. Returns whether any field changed.
pub fn apply_progress(quest: &mut Quest, amount: i64, now: DateTime<Utc>) -> bool {
    if amount <= 0 {
        return false;
    }

    let before = quest.clone();
    quest_reset::ensure_current(quest, now);

    let raw = quest.progress.saturating_add(amount);
    quest.progress = if quest.quest_type.is_capped() {
        raw.min(quest.goal)
    } else {
        raw
    };

    if quest.progress < quest.goal {
        quest.reward_claimed = false;
    }

    *quest != before
}

/// Mark the reward of a completed quest as claimed.
///
/// The quest is brought up to date first, so a lapsed window reports
/// [`QuestError::NotCompleted`]. On error `quest` is left untouched.
pub fn claim(quest: &mut Quest, now: DateTime<Utc>) -> Result<(), QuestError> {
    let mut current = quest.clone();
    quest_reset::ensure_current(&mut current, now);

    if !current.is_completed() {
        return Err(QuestError::NotCompleted);
    }
    if current.reward_claimed {
        return Err(QuestError::AlreadyClaimed);
    }

    current.reward_claimed = true;
    *quest = current;
    Ok(())
}

/// Advance the quest of `quest_type` by `amount` and persist it.
///
/// Missing quest types and non-positive amounts are ignored and yield
/// `Ok(None)`. Concurrent writers are detected through the row version and
/// the whole read-modify-write is retried.
pub async fn advance<S, C>(
    store: &S,
    clock: &C,
    quest_type: QuestType,
    amount: i64,
) -> Result<Option<Quest>, QuestError>
where
    S: QuestStore + ?Sized,
    C: Clock,
{
    if amount <= 0 {
        log::debug!("Ignoring non-positive advance of {} for {} quest", amount, quest_type.as_str());
        return Ok(None);
    }

    for attempt in 1..=MAX_SAVE_ATTEMPTS {
        let Some(mut quest) = store.get_by_type(quest_type).await? else {
            log::debug!("No {} quest seeded, skipping advance", quest_type.as_str());
            return Ok(None);
        };

        if !apply_progress(&mut quest, amount, clock.now_utc()) {
            return Ok(Some(quest));
        }

        match store.save(&quest).await {
            Ok(saved) => return Ok(Some(saved)),
            Err(StoreError::Conflict { id }) => {
                log::warn!(
                    "Quest {} changed during advance (attempt {}/{})",
                    id,
                    attempt,
                    MAX_SAVE_ATTEMPTS
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(QuestError::Conflict)
}

/// Claim the reward of the quest with `quest_id`
pub async fn claim_reward<S, C>(store: &S, clock: &C, quest_id: &Uuid) -> Result<Quest, QuestError>
where
    S: QuestStore + ?Sized,
    C: Clock,
{
    let mut quest = store.get(quest_id).await?.ok_or(QuestError::NotFound)?;

    claim(&mut quest, clock.now_utc())?;

    match store.save(&quest).await {
        Ok(saved) => {
            log::info!("Reward claimed for {} quest {}", saved.quest_type.as_str(), saved.id);
            Ok(saved)
        }
        // Someone else touched the quest; let the caller re-check its state
        Err(StoreError::Conflict { .. }) => Err(QuestError::Conflict),
        Err(e) => Err(e.into()),
    }
}
