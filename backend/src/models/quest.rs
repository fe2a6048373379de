use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for quests
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestRow {
    pub id: String,
    pub name: String,
    pub quest_type: String,
    pub goal: i64,
    pub progress: i64,
    pub reward: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub reward_claimed: bool,
    pub version: i64,
}

impl QuestRow {
    pub fn to_shared(&self) -> shared::Quest {
        let quest_type = self.quest_type.parse().unwrap_or_else(|_| {
            log::warn!(
                "Quest {} has unknown type {:?}, treating it as daily",
                self.id,
                self.quest_type
            );
            shared::QuestType::Daily
        });

        shared::Quest {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            name: self.name.clone(),
            quest_type,
            goal: self.goal,
            progress: self.progress,
            reward: self.reward.clone(),
            expires_at: self.expires_at,
            reward_claimed: self.reward_claimed,
            version: self.version,
        }
    }
}
