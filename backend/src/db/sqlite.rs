use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::{Quest, QuestType, SprintCompletion};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{QuestStore, SprintHistoryStore, StoreError};
use crate::models::{QuestRow, SprintCompletionRow};
use crate::services::streak;

/// SQLite-backed quest and sprint history storage
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl QuestStore for SqliteStore {
    async fn get_by_type(&self, quest_type: QuestType) -> Result<Option<Quest>, StoreError> {
        let quest: Option<QuestRow> = sqlx::query_as("SELECT * FROM quests WHERE quest_type = ?")
            .bind(quest_type.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(quest.map(|q| q.to_shared()))
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Quest>, StoreError> {
        let quest: Option<QuestRow> = sqlx::query_as("SELECT * FROM quests WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(quest.map(|q| q.to_shared()))
    }

    async fn get_all(&self) -> Result<Vec<Quest>, StoreError> {
        let quests: Vec<QuestRow> = sqlx::query_as("SELECT * FROM quests")
            .fetch_all(&self.pool)
            .await?;

        Ok(quests.into_iter().map(|q| q.to_shared()).collect())
    }

    async fn insert(&self, quest: &Quest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO quests (id, name, quest_type, goal, progress, reward, expires_at, reward_claimed, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(quest.id.to_string())
        .bind(&quest.name)
        .bind(quest.quest_type.as_str())
        .bind(quest.goal)
        .bind(quest.progress)
        .bind(&quest.reward)
        .bind(quest.expires_at)
        .bind(quest.reward_claimed)
        .bind(quest.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, quest: &Quest) -> Result<Quest, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE quests
            SET name = ?, quest_type = ?, goal = ?, progress = ?, reward = ?, expires_at = ?,
                reward_claimed = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&quest.name)
        .bind(quest.quest_type.as_str())
        .bind(quest.goal)
        .bind(quest.progress)
        .bind(&quest.reward)
        .bind(quest.expires_at)
        .bind(quest.reward_claimed)
        .bind(quest.id.to_string())
        .bind(quest.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the row is gone or its version moved on
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quests WHERE id = ?")
                .bind(quest.id.to_string())
                .fetch_one(&self.pool)
                .await?;

            if exists == 0 {
                return Err(StoreError::Database(sqlx::Error::RowNotFound));
            }
            return Err(StoreError::Conflict { id: quest.id });
        }

        Ok(Quest {
            version: quest.version + 1,
            ..quest.clone()
        })
    }
}

#[async_trait]
impl SprintHistoryStore for SqliteStore {
    async fn record_completion(&self, completion: &SprintCompletion) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sprint_completions (id, project_id, completed_at, duration_minutes)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(completion.id.to_string())
        .bind(completion.project_id.map(|p| p.to_string()))
        .bind(completion.completed_at)
        .bind(completion.duration_minutes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_completions_by_day(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i64>, StoreError> {
        let start = from.and_time(NaiveTime::MIN).and_utc();
        let end = to_exclusive.and_time(NaiveTime::MIN).and_utc();

        let completions: Vec<SprintCompletionRow> = sqlx::query_as(
            "SELECT * FROM sprint_completions WHERE completed_at >= ? AND completed_at < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(streak::bucket_by_day(
            completions.iter().map(|c| c.to_shared().completed_at),
        ))
    }

    async fn count_total_completed(&self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sprint_completions")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

/// Fresh in-memory database with migrations applied
#[cfg(test)]
pub(crate) async fn memory_store() -> SqliteStore {
    // A single connection keeps every query on the same in-memory database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    SqliteStore::new(pool)
}
