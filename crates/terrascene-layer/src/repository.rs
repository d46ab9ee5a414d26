//! Repository trait for layers.

use async_trait::async_trait;
use terrascene_core::error::DomainError;
use terrascene_core::id::{LayerId, SceneId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};

use crate::domain::layer::{Layer, LayerGroup};

/// Stores the layer tree of every scene.
#[async_trait]
pub trait LayerRepository: Send + Sync {
    /// Loads one layer.
    async fn find_layer(&self, id: LayerId) -> Result<Option<Layer>, DomainError>;

    /// Loads the layers of `scene` rendered by `plugin` (and `extension`,
    /// when given).
    async fn find_layers_by_plugin_and_extension(
        &self,
        scene: SceneId,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Result<Vec<Layer>, DomainError>;

    /// Loads the layers of `scene` whose info-box holds a block from `plugin`
    /// (and `extension`, when given).
    async fn find_layers_by_plugin_and_extension_of_blocks(
        &self,
        scene: SceneId,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Result<Vec<Layer>, DomainError>;

    /// Loads the groups that directly contain any of `ids`.
    async fn find_parent_layers(
        &self,
        scene: SceneId,
        ids: &[LayerId],
    ) -> Result<Vec<LayerGroup>, DomainError>;

    /// Inserts or replaces one layer.
    async fn save_layer(&self, layer: &Layer) -> Result<(), DomainError>;

    /// Inserts or replaces many layers.
    async fn save_layers(&self, layers: &[Layer]) -> Result<(), DomainError>;

    /// Deletes many layers. Missing ids are ignored.
    async fn remove_layers(&self, ids: &[LayerId]) -> Result<(), DomainError>;

    /// Rewrites every reference to `old` in the layers of `scene`.
    async fn update_layer_plugin(
        &self,
        scene: SceneId,
        old: &PluginId,
        new: &PluginId,
    ) -> Result<(), DomainError>;
}
