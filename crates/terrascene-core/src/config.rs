//! Engine configuration, passed explicitly to the code that needs it.

use crate::plugin_id::{PluginId, PropertySchemaId};

/// Schema key of the official plugin's cluster configuration.
pub const CLUSTER_SCHEMA_KEY: &str = "cluster";

/// Settings shared by the scene use cases.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The built-in plugin bound to every new scene.
    pub official_plugin: PluginId,
    /// Schema of the properties created for new clusters.
    pub cluster_schema: PropertySchemaId,
}

impl EngineConfig {
    /// A configuration built around `official_plugin`.
    #[must_use]
    pub fn with_official_plugin(official_plugin: PluginId) -> Self {
        Self {
            cluster_schema: PropertySchemaId::new_unchecked(
                official_plugin.clone(),
                CLUSTER_SCHEMA_KEY,
            ),
            official_plugin,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_official_plugin(PluginId::official())
    }
}
