//! Repository traits for scenes and scene locks.

use async_trait::async_trait;
use terrascene_core::error::DomainError;
use terrascene_core::id::SceneId;

use crate::domain::lock::LockMode;
use crate::domain::scene::Scene;

/// Stores scene aggregates.
#[async_trait]
pub trait SceneRepository: Send + Sync {
    /// Loads one scene.
    async fn find_scene(&self, id: SceneId) -> Result<Option<Scene>, DomainError>;

    /// Inserts or replaces a scene.
    async fn save_scene(&self, scene: &Scene) -> Result<(), DomainError>;
}

/// Stores the lock mode of every scene. A scene with no stored mode is
/// [`LockMode::Free`].
///
/// Implementations must make [`SceneLockRepository::update_lock`] a single
/// atomic compare-and-swap.
#[async_trait]
pub trait SceneLockRepository: Send + Sync {
    /// Reads the lock mode of one scene.
    async fn get_lock(&self, scene: SceneId) -> Result<LockMode, DomainError>;

    /// Reads the lock modes of many scenes, in the order requested.
    async fn get_locks(&self, scenes: &[SceneId]) -> Result<Vec<LockMode>, DomainError>;

    /// Sets the lock of `scene` to `after` if it currently is `before`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SceneLocked` and leaves the stored mode unchanged
    /// if it is not `before`.
    async fn update_lock(
        &self,
        scene: SceneId,
        before: LockMode,
        after: LockMode,
    ) -> Result<(), DomainError>;

    /// Unconditionally returns the lock of `scene` to free.
    async fn release_lock(&self, scene: SceneId) -> Result<(), DomainError>;

    /// Returns every scene lock to free.
    async fn release_all_locks(&self) -> Result<(), DomainError>;
}
