use chrono::{DateTime, Utc};
use shared::{Quest, QuestType, SprintCompletion};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{QuestStore, SprintHistoryStore, StoreError};
use crate::services::quest_progress::{self, QuestError};

#[derive(Debug, Error)]
pub enum SprintError {
    #[error("Sprint duration must not be negative")]
    InvalidDuration,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Quest error: {0}")]
    Quest(#[from] QuestError),
}

/// Input for a sprint that just finished
#[derive(Debug, Clone)]
pub struct SprintCompletionBuilder {
    project_id: Option<Uuid>,
    duration_minutes: i64,
}

impl SprintCompletionBuilder {
    pub fn new(duration_minutes: i64) -> Self {
        Self {
            project_id: None,
            duration_minutes,
        }
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn completed_at(self, completed_at: DateTime<Utc>) -> SprintCompletion {
        SprintCompletion {
            id: Uuid::new_v4(),
            project_id: self.project_id,
            completed_at,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Record a finished sprint and advance every quest type by one.
///
/// Returns the recorded completion and the quests that exist for it.
pub async fn complete_sprint<Q, H, C>(
    quest_store: &Q,
    history: &H,
    clock: &C,
    sprint: SprintCompletionBuilder,
) -> Result<(SprintCompletion, Vec<Quest>), SprintError>
where
    Q: QuestStore + ?Sized,
    H: SprintHistoryStore + ?Sized,
    C: Clock,
{
    if sprint.duration_minutes < 0 {
        return Err(SprintError::InvalidDuration);
    }

    let completion = sprint.completed_at(clock.now_utc());
    history.record_completion(&completion).await?;

    let mut quests = Vec::new();
    for quest_type in QuestType::ALL {
        if let Some(quest) = quest_progress::advance(quest_store, clock, quest_type, 1).await? {
            quests.push(quest);
        }
    }

    log::info!(
        "Sprint {} completed ({} min), advanced {} quests",
        completion.id,
        completion.duration_minutes,
        quests.len()
    );

    Ok((completion, quests))
}
