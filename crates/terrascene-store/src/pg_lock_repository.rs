//! `PostgreSQL` implementation of the `SceneLockRepository` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use terrascene_core::error::DomainError;
use terrascene_core::id::SceneId;
use terrascene_scene::domain::lock::LockMode;
use terrascene_scene::repository::SceneLockRepository;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL-backed scene lock store. Free scenes have no row.
#[derive(Debug, Clone)]
pub struct PgSceneLockRepository {
    pool: PgPool,
}

impl PgSceneLockRepository {
    /// Creates a new `PgSceneLockRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

#[async_trait]
impl SceneLockRepository for PgSceneLockRepository {
    async fn get_lock(&self, scene: SceneId) -> Result<LockMode, DomainError> {
        let mode: Option<String> =
            sqlx::query_scalar("SELECT lock_mode FROM scene_locks WHERE scene_id = $1")
                .bind(scene.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        mode.map_or(Ok(LockMode::Free), |m| m.parse())
    }

    async fn get_locks(&self, scenes: &[SceneId]) -> Result<Vec<LockMode>, DomainError> {
        let ids: Vec<Uuid> = scenes.iter().map(SceneId::as_uuid).collect();
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT scene_id, lock_mode FROM scene_locks WHERE scene_id = ANY($1)")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await
                .map_err(infrastructure)?;
        let stored: HashMap<Uuid, String> = rows.into_iter().collect();
        ids.iter()
            .map(|id| stored.get(id).map_or(Ok(LockMode::Free), |m| m.parse()))
            .collect()
    }

    async fn update_lock(
        &self,
        scene: SceneId,
        before: LockMode,
        after: LockMode,
    ) -> Result<(), DomainError> {
        // One statement either way, so concurrent callers cannot both win.
        let result = if before == LockMode::Free {
            sqlx::query(
                r"
                INSERT INTO scene_locks (scene_id, lock_mode, updated_at)
                VALUES ($1, $3, NOW())
                ON CONFLICT (scene_id) DO UPDATE
                    SET lock_mode = EXCLUDED.lock_mode, updated_at = NOW()
                    WHERE scene_locks.lock_mode = $2
                ",
            )
        } else {
            sqlx::query(
                r"
                UPDATE scene_locks
                SET lock_mode = $3, updated_at = NOW()
                WHERE scene_id = $1 AND lock_mode = $2
                ",
            )
        }
        .bind(scene.as_uuid())
        .bind(before.as_str())
        .bind(after.as_str())
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            debug!(
                scene_id = %scene,
                before = %before,
                after = %after,
                "lock compare-and-swap lost"
            );
            return Err(DomainError::SceneLocked(scene));
        }
        Ok(())
    }

    async fn release_lock(&self, scene: SceneId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM scene_locks WHERE scene_id = $1")
            .bind(scene.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn release_all_locks(&self) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM scene_locks")
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}
