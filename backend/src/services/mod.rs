pub mod progress_stats;
pub mod quest_progress;
pub mod quest_reset;
pub mod quests;
pub mod rollover;
pub mod sprints;
pub mod standing;
pub mod streak;
