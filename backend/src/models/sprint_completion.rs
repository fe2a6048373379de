use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for completed sprints
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SprintCompletionRow {
    pub id: String,
    pub project_id: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl SprintCompletionRow {
    pub fn to_shared(&self) -> shared::SprintCompletion {
        shared::SprintCompletion {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            project_id: self.project_id.as_ref().and_then(|id| Uuid::parse_str(id).ok()),
            completed_at: self.completed_at,
            duration_minutes: self.duration_minutes,
        }
    }
}
