//! Scoped acquisition of the scene lock.
//!
//! A [`SceneLockGuard`] moves a scene's lock out of `free` and returns it to
//! `free` when the guarded operation ends. Callers release explicitly with
//! [`SceneLockGuard::release`]; if the guard is dropped instead (an early
//! return, a `?`, a panic), the release is spawned on the current runtime.

use std::future::Future;
use std::sync::Arc;

use terrascene_core::error::DomainError;
use terrascene_core::id::SceneId;
use tokio::runtime::Handle;
use tracing::{error, warn};

use crate::domain::lock::LockMode;
use crate::repository::SceneLockRepository;

/// Holds a scene lock until released or dropped.
pub struct SceneLockGuard {
    scene: SceneId,
    mode: LockMode,
    locks: Option<Arc<dyn SceneLockRepository>>,
}

impl SceneLockGuard {
    /// Moves the lock of `scene` from `free` to `mode`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SceneLocked` if the scene is not free.
    pub async fn acquire(
        locks: Arc<dyn SceneLockRepository>,
        scene: SceneId,
        mode: LockMode,
    ) -> Result<Self, DomainError> {
        if let Err(err) = locks.update_lock(scene, LockMode::Free, mode).await {
            warn!(scene_id = %scene, mode = %mode, "scene lock contention");
            return Err(err);
        }
        Ok(Self {
            scene,
            mode,
            locks: Some(locks),
        })
    }

    /// The locked scene.
    #[must_use]
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// The mode held.
    #[must_use]
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Returns the lock to `free`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock store fails.
    pub async fn release(mut self) -> Result<(), DomainError> {
        match self.locks.take() {
            Some(locks) => locks.release_lock(self.scene).await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for SceneLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneLockGuard")
            .field("scene", &self.scene)
            .field("mode", &self.mode)
            .field("held", &self.locks.is_some())
            .finish()
    }
}

impl Drop for SceneLockGuard {
    fn drop(&mut self) {
        let Some(locks) = self.locks.take() else {
            return;
        };
        let scene = self.scene;
        warn!(scene_id = %scene, mode = %self.mode, "scene lock dropped without release");
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = locks.release_lock(scene).await {
                        error!(scene_id = %scene, error = %err, "failed to release scene lock");
                    }
                });
            }
            Err(_) => {
                error!(scene_id = %scene, "no runtime to release scene lock");
            }
        }
    }
}

/// Runs `operation` while holding the lock of `scene` in `mode`, releasing it
/// on every exit path.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the lock cannot be acquired, or
/// whatever `operation` returns.
pub async fn with_scene_lock<T, F, Fut>(
    locks: &Arc<dyn SceneLockRepository>,
    scene: SceneId,
    mode: LockMode,
    operation: F,
) -> Result<T, DomainError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let guard = SceneLockGuard::acquire(Arc::clone(locks), scene, mode).await?;
    let result = operation().await;
    if let Err(err) = guard.release().await {
        error!(scene_id = %scene, error = %err, "failed to release scene lock");
    }
    result
}

/// Fails if `scene` is held in an exclusive mode.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked.
pub async fn check_scene_lock(
    locks: &dyn SceneLockRepository,
    scene: SceneId,
) -> Result<(), DomainError> {
    let mode = locks.get_lock(scene).await?;
    if mode.is_locked() {
        warn!(scene_id = %scene, mode = %mode, "scene is locked");
        return Err(DomainError::SceneLocked(scene));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Default)]
    struct MockLockRepository {
        modes: Mutex<HashMap<SceneId, LockMode>>,
    }

    impl MockLockRepository {
        fn mode(&self, scene: SceneId) -> LockMode {
            self.modes
                .lock()
                .unwrap()
                .get(&scene)
                .copied()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl SceneLockRepository for MockLockRepository {
        async fn get_lock(&self, scene: SceneId) -> Result<LockMode, DomainError> {
            Ok(self.mode(scene))
        }

        async fn get_locks(&self, scenes: &[SceneId]) -> Result<Vec<LockMode>, DomainError> {
            Ok(scenes.iter().map(|s| self.mode(*s)).collect())
        }

        async fn update_lock(
            &self,
            scene: SceneId,
            before: LockMode,
            after: LockMode,
        ) -> Result<(), DomainError> {
            let mut modes = self.modes.lock().unwrap();
            let current = modes.get(&scene).copied().unwrap_or_default();
            if current != before {
                return Err(DomainError::SceneLocked(scene));
            }
            modes.insert(scene, after);
            Ok(())
        }

        async fn release_lock(&self, scene: SceneId) -> Result<(), DomainError> {
            self.modes.lock().unwrap().remove(&scene);
            Ok(())
        }

        async fn release_all_locks(&self) -> Result<(), DomainError> {
            self.modes.lock().unwrap().clear();
            Ok(())
        }
    }

    fn repo() -> (Arc<MockLockRepository>, Arc<dyn SceneLockRepository>) {
        let mock = Arc::new(MockLockRepository::default());
        let locks: Arc<dyn SceneLockRepository> = mock.clone();
        (mock, locks)
    }

    #[tokio::test]
    async fn test_acquire_then_release_returns_to_free() {
        // Arrange
        let (mock, locks) = repo();
        let scene = SceneId::new();

        // Act
        let guard = SceneLockGuard::acquire(locks, scene, LockMode::PluginUpgrading)
            .await
            .unwrap();
        let held = mock.mode(scene);
        guard.release().await.unwrap();

        // Assert
        assert_eq!(held, LockMode::PluginUpgrading);
        assert_eq!(mock.mode(scene), LockMode::Free);
    }

    #[tokio::test]
    async fn test_second_acquire_fails_and_keeps_first_mode() {
        // Arrange
        let (mock, locks) = repo();
        let scene = SceneId::new();
        let _guard = SceneLockGuard::acquire(Arc::clone(&locks), scene, LockMode::PluginUpgrading)
            .await
            .unwrap();

        // Act
        let second = SceneLockGuard::acquire(locks, scene, LockMode::DatasetSyncing).await;

        // Assert
        assert!(matches!(second, Err(DomainError::SceneLocked(s)) if s == scene));
        assert_eq!(mock.mode(scene), LockMode::PluginUpgrading);
    }

    #[tokio::test]
    async fn test_dropped_guard_releases_in_background() {
        // Arrange
        let (mock, locks) = repo();
        let scene = SceneId::new();

        // Act
        {
            let _guard = SceneLockGuard::acquire(locks, scene, LockMode::Publishing)
                .await
                .unwrap();
        }
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        // Assert
        assert_eq!(mock.mode(scene), LockMode::Free);
    }

    #[tokio::test]
    async fn test_with_scene_lock_releases_after_error() {
        // Arrange
        let (mock, locks) = repo();
        let scene = SceneId::new();

        // Act
        let result: Result<(), DomainError> =
            with_scene_lock(&locks, scene, LockMode::PluginUpgrading, || async {
                Err(DomainError::Validation("boom".to_owned()))
            })
            .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(mock.mode(scene), LockMode::Free);
    }

    #[tokio::test]
    async fn test_check_scene_lock_ignores_pending() {
        let (mock, locks) = repo();
        let scene = SceneId::new();
        locks
            .update_lock(scene, LockMode::Free, LockMode::Pending)
            .await
            .unwrap();

        assert!(check_scene_lock(mock.as_ref(), scene).await.is_ok());

        locks.release_lock(scene).await.unwrap();
        locks
            .update_lock(scene, LockMode::Free, LockMode::DatasetSyncing)
            .await
            .unwrap();
        let result = check_scene_lock(mock.as_ref(), scene).await;

        assert!(matches!(result, Err(DomainError::SceneLocked(_))));
    }
}
