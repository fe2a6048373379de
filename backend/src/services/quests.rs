use shared::{Quest, QuestType};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::QuestConfig;
use crate::db::{QuestStore, StoreError};
use crate::services::quest_reset;

fn default_name(quest_type: QuestType) -> &'static str {
    match quest_type {
        QuestType::Daily => "Daily Focus",
        QuestType::Weekly => "Weekly Grind",
        QuestType::Epic => "Epic Journey",
    }
}

fn default_reward(quest_type: QuestType) -> &'static str {
    match quest_type {
        QuestType::Daily => "Guilt-free break",
        QuestType::Weekly => "Pick the weekend treat",
        QuestType::Epic => "Legendary badge",
    }
}

/// Create the quest for every type that has none yet. Returns the quests
/// that were created.
pub async fn seed_default_quests<S, C>(
    store: &S,
    clock: &C,
    config: &QuestConfig,
) -> Result<Vec<Quest>, StoreError>
where
    S: QuestStore + ?Sized,
    C: Clock,
{
    let now = clock.now_utc();
    let mut created = Vec::new();

    for quest_type in QuestType::ALL {
        if store.get_by_type(quest_type).await?.is_some() {
            continue;
        }

        let quest = Quest {
            id: Uuid::new_v4(),
            name: default_name(quest_type).to_string(),
            quest_type,
            goal: config.fallback_goal(quest_type),
            progress: 0,
            reward: Some(default_reward(quest_type).to_string()),
            expires_at: quest_reset::next_expiry(quest_type, now)
                .unwrap_or_else(quest_reset::never_expires),
            reward_claimed: false,
            version: 0,
        };
        store.insert(&quest).await?;

        log::info!("Seeded {} quest {} (goal {})", quest_type.as_str(), quest.id, quest.goal);
        created.push(quest);
    }

    Ok(created)
}

/// All quests with their windows brought up to date, ordered daily,
/// weekly, epic. Refreshed quests are persisted.
pub async fn list_quests<S, C>(store: &S, clock: &C) -> Result<Vec<Quest>, StoreError>
where
    S: QuestStore + ?Sized,
    C: Clock,
{
    let now = clock.now_utc();
    let mut quests = store.get_all().await?;
    quests.sort_by_key(|q| q.quest_type as u8);

    for quest in quests.iter_mut() {
        if !quest_reset::ensure_current(quest, now) {
            continue;
        }
        match store.save(quest).await {
            Ok(saved) => *quest = saved,
            Err(StoreError::Conflict { id }) => {
                // Somebody else wrote it; report what is stored now
                log::warn!("Quest {} modified while listing, re-reading", id);
                if let Some(mut fresh) = store.get(&id).await? {
                    quest_reset::ensure_current(&mut fresh, now);
                    *quest = fresh;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(quests)
}
