use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use sprintquest::clock::SystemClock;
use sprintquest::config::Config;
use sprintquest::db::SqliteStore;
use sprintquest::services::{progress_stats, quests, rollover};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    log::info!("Opening quest database at {}", config.database_url);

    // Create database pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    log::info!("Database migrations completed");

    let store = Arc::new(SqliteStore::new(pool));
    let clock = SystemClock;

    let seeded = quests::seed_default_quests(store.as_ref(), &clock, &config.quest).await?;
    if !seeded.is_empty() {
        log::info!("Seeded {} default quests", seeded.len());
    }

    let view = progress_stats::get_progress(store.as_ref(), store.as_ref(), &clock, &config.quest).await?;
    match view.next_threshold {
        Some(next) => log::info!(
            "Standing {} with {} sprints, {:.0}% of the way to {}, streak {} days",
            view.standing.as_str(),
            view.total_completed,
            view.percent_display(),
            next,
            view.streak_days
        ),
        None => log::info!(
            "Standing {} with {} sprints, streak {} days",
            view.standing.as_str(),
            view.total_completed,
            view.streak_days
        ),
    }
    log::info!("Current progress: {}", serde_json::to_string(&view)?);

    // Start quest rollover scheduler
    let store_for_scheduler = Arc::clone(&store);
    let grace_seconds = config.rollover_grace_seconds;
    tokio::spawn(async move {
        rollover::start_rollover_scheduler(store_for_scheduler, SystemClock, grace_seconds).await;
    });
    log::info!("Quest rollover scheduler started");

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");

    Ok(())
}
