//! Repository trait for plugin manifests.

use async_trait::async_trait;
use terrascene_core::error::DomainError;
use terrascene_core::id::SceneId;
use terrascene_core::plugin_id::PluginId;

use crate::domain::manifest::Manifest;

/// Stores uploaded and built-in plugin manifests.
#[async_trait]
pub trait PluginRepository: Send + Sync {
    /// Loads a plugin as seen from `scene`. Plugins private to another scene
    /// are reported as absent.
    async fn find_plugin(
        &self,
        id: &PluginId,
        scene: Option<SceneId>,
    ) -> Result<Option<Manifest>, DomainError>;

    /// Loads every plugin among `ids` that exists, in the order requested.
    async fn find_plugins(&self, ids: &[PluginId]) -> Result<Vec<Manifest>, DomainError>;

    /// Inserts or replaces a plugin.
    async fn save_plugin(&self, manifest: &Manifest) -> Result<(), DomainError>;

    /// Deletes a plugin. Missing ids are ignored.
    async fn remove_plugin(&self, id: &PluginId) -> Result<(), DomainError>;
}
