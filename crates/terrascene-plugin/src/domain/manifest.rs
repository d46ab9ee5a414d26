//! Plugin manifests and the extensions they declare.

use std::fmt;

use serde::{Deserialize, Serialize};
use terrascene_core::error::DomainError;
use terrascene_core::id::SceneId;
use terrascene_core::plugin_id::{ExtensionId, PluginId, PropertySchemaId};
use terrascene_property::domain::schema::{PropertySchema, SchemaGroup};

/// Schema key used for a plugin's own (scene-level) configuration.
pub const PLUGIN_SCHEMA_KEY: &str = "__plugin";

/// What an extension provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionType {
    /// A layer item type.
    Primitive,
    /// A UI widget.
    Widget,
    /// An info-box block.
    Block,
    /// A scene renderer.
    Visualizer,
    /// An info-box container.
    Infobox,
    /// A marker-cluster style.
    Cluster,
}

impl ExtensionType {
    /// The lowercase name used in manifests.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Widget => "widget",
            Self::Block => "block",
            Self::Visualizer => "visualizer",
            Self::Infobox => "infobox",
            Self::Cluster => "cluster",
        }
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One capability a plugin exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Extension identifier, unique within the plugin.
    pub id: ExtensionId,
    /// What the extension provides.
    pub extension_type: ExtensionType,
    /// Schema of the properties bound to instances of this extension.
    pub schema: PropertySchema,
}

/// One version of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Plugin identifier.
    pub id: PluginId,
    /// Display name.
    pub name: String,
    /// Schema of the plugin's scene-level configuration, if it has one.
    pub schema: Option<PropertySchema>,
    /// Extensions in declaration order.
    pub extensions: Vec<Extension>,
}

impl Manifest {
    /// Looks up an extension.
    #[must_use]
    pub fn extension(&self, id: &ExtensionId) -> Option<&Extension> {
        self.extensions.iter().find(|e| &e.id == id)
    }

    /// Every schema this manifest declares.
    #[must_use]
    pub fn schemas(&self) -> Vec<&PropertySchema> {
        self.schema
            .iter()
            .chain(self.extensions.iter().map(|e| &e.schema))
            .collect()
    }

    /// Every schema id this manifest declares.
    #[must_use]
    pub fn schema_ids(&self) -> Vec<PropertySchemaId> {
        self.schemas().into_iter().map(|s| s.id.clone()).collect()
    }

    /// Parses a YAML manifest. `scene` scopes the plugin to one scene when
    /// it was uploaded privately.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the YAML is malformed and
    /// `DomainError::MalformedId` if an id in it is invalid.
    pub fn from_yaml(source: &str, scene: Option<SceneId>) -> Result<Self, DomainError> {
        let raw: RawManifest = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid plugin manifest: {e}")))?;
        raw.into_manifest(scene)
    }
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default)]
    groups: Vec<SchemaGroup>,
}

#[derive(Debug, Deserialize)]
struct RawExtension {
    id: String,
    #[serde(rename = "type")]
    extension_type: ExtensionType,
    schema: Option<RawSchema>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    id: String,
    version: Option<String>,
    name: Option<String>,
    schema: Option<RawSchema>,
    #[serde(default)]
    extensions: Vec<RawExtension>,
}

impl RawManifest {
    fn into_manifest(self, scene: Option<SceneId>) -> Result<Manifest, DomainError> {
        let id = PluginId::new(&self.id, self.version.as_deref(), scene)?;

        let schema = self
            .schema
            .map(|s| {
                Ok::<_, DomainError>(PropertySchema {
                    id: PropertySchemaId::new(id.clone(), PLUGIN_SCHEMA_KEY)?,
                    groups: s.groups,
                })
            })
            .transpose()?;

        let mut extensions: Vec<Extension> = Vec::with_capacity(self.extensions.len());
        for raw in self.extensions {
            let ext_id = ExtensionId::new(raw.id)?;
            if extensions.iter().any(|e| e.id == ext_id) {
                return Err(DomainError::Validation(format!(
                    "duplicate extension '{ext_id}' in plugin {id}"
                )));
            }
            extensions.push(Extension {
                schema: PropertySchema {
                    id: PropertySchemaId::new(id.clone(), ext_id.as_str())?,
                    groups: raw.schema.map(|s| s.groups).unwrap_or_default(),
                },
                id: ext_id,
                extension_type: raw.extension_type,
            });
        }

        Ok(Manifest {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id,
            schema,
            extensions,
        })
    }
}
