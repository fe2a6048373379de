//! Storage interfaces consumed by the quest engine.
//!
//! The engine only talks to these traits; [`SqliteStore`] is the adapter
//! used by the daemon and the tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Quest, QuestType, SprintCompletion};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

pub mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored row changed since the quest was read
    #[error("Quest {id} was modified concurrently")]
    Conflict { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Quest records, one per quest type
#[async_trait]
pub trait QuestStore: Send + Sync {
    async fn get_by_type(&self, quest_type: QuestType) -> Result<Option<Quest>, StoreError>;

    async fn get(&self, id: &Uuid) -> Result<Option<Quest>, StoreError>;

    async fn get_all(&self) -> Result<Vec<Quest>, StoreError>;

    async fn insert(&self, quest: &Quest) -> Result<(), StoreError>;

    /// Write every field of `quest` if the stored version still equals
    /// `quest.version`. Returns the quest with its bumped version, or
    /// [`StoreError::Conflict`] when another writer got there first.
    async fn save(&self, quest: &Quest) -> Result<Quest, StoreError>;
}

/// History of completed sprints
#[async_trait]
pub trait SprintHistoryStore: Send + Sync {
    async fn record_completion(&self, completion: &SprintCompletion) -> Result<(), StoreError>;

    /// Completions per UTC day for days in `[from, to_exclusive)`
    async fn count_completions_by_day(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, StoreError>;

    async fn count_total_completed(&self) -> Result<i64, StoreError>;
}
