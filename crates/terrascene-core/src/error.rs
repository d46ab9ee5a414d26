//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::id::{ClusterId, SceneId, WidgetId};
use crate::plugin_id::{ExtensionId, PluginId};

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The operator lacks write access to the target workspace.
    #[error("operation denied")]
    OperationDenied,

    /// The scene's lock did not hold the expected mode.
    #[error("scene is locked: {0}")]
    SceneLocked(SceneId),

    /// The plugin does not exist or is not visible from the target scene.
    #[error("plugin not found: {0}")]
    PluginNotFound(PluginId),

    /// A plugin with the same name is already installed in the scene.
    #[error("plugin already installed: {0}")]
    PluginAlreadyInstalled(PluginId),

    /// The plugin is not installed in the scene.
    #[error("plugin not installed: {0}")]
    PluginNotInstalled(PluginId),

    /// An upgrade targets a different plugin, or the same version.
    #[error("invalid plugin upgrade from {from} to {to}")]
    InvalidPluginUpgrade {
        /// The installed plugin.
        from: PluginId,
        /// The requested upgrade target.
        to: PluginId,
    },

    /// The official plugin cannot be uninstalled.
    #[error("the official plugin cannot be uninstalled")]
    CannotUninstallOfficialPlugin,

    /// The plugin does not declare the requested extension.
    #[error("extension {extension} not found in plugin {plugin}")]
    ExtensionNotFound {
        /// The plugin that was searched.
        plugin: PluginId,
        /// The missing extension.
        extension: ExtensionId,
    },

    /// The extension exists but has the wrong type for the operation.
    #[error("extension {extension} is not a {expected} extension")]
    InvalidExtensionType {
        /// The offending extension.
        extension: ExtensionId,
        /// The type the operation requires.
        expected: &'static str,
    },

    /// The scene has no widget with this id.
    #[error("widget not found: {0}")]
    WidgetNotFound(WidgetId),

    /// The scene has no cluster with this id.
    #[error("cluster not found: {0}")]
    ClusterNotFound(ClusterId),

    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// An identifier could not be constructed from its input.
    #[error("malformed identifier: {0}")]
    MalformedId(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
