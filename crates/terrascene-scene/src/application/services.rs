//! The collaborators a scene use case runs against.

use std::sync::Arc;

use terrascene_core::clock::Clock;
use terrascene_core::config::EngineConfig;
use terrascene_core::transaction::TransactionManager;
use terrascene_layer::repository::LayerRepository;
use terrascene_plugin::repository::PluginRepository;
use terrascene_property::repository::{PropertyRepository, PropertySchemaRepository};

use crate::repository::{SceneLockRepository, SceneRepository};

/// Repositories, transaction manager, clock, and configuration shared by the
/// scene use cases.
#[derive(Clone)]
pub struct SceneServices {
    /// Scene aggregates.
    pub scenes: Arc<dyn SceneRepository>,
    /// Scene lock modes.
    pub locks: Arc<dyn SceneLockRepository>,
    /// Plugin manifests.
    pub plugins: Arc<dyn PluginRepository>,
    /// Configuration instances.
    pub properties: Arc<dyn PropertyRepository>,
    /// Configuration schemas.
    pub schemas: Arc<dyn PropertySchemaRepository>,
    /// Layer trees.
    pub layers: Arc<dyn LayerRepository>,
    /// Storage transactions spanning every repository above except `locks`.
    pub transactions: Arc<dyn TransactionManager>,
    /// Time source for timestamps and events.
    pub clock: Arc<dyn Clock>,
    /// Engine settings.
    pub config: EngineConfig,
}

impl std::fmt::Debug for SceneServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneServices")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
