//! Scene lock maintenance.
//!
//! Applies the lock table migration and returns every scene lock to `free`.
//! Run it before starting engine processes so that locks held by a crashed
//! instance do not block the scenes it was editing.

use std::error::Error;

use terrascene_scene::repository::SceneLockRepository;
use terrascene_store::config::StoreConfig;
use terrascene_store::pg_lock_repository::PgSceneLockRepository;
use terrascene_store::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = StoreConfig::from_env()?;
    tracing::info!(max_connections = config.max_connections, "connecting to lock store");
    let pool = config.connect().await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    PgSceneLockRepository::new(pool).release_all_locks().await?;
    tracing::info!("released all scene locks");

    Ok(())
}
