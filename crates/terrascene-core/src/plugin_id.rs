//! Plugin, extension, and configuration-schema identifiers.
//!
//! A plugin identifier is `name~version`, optionally prefixed by the scene
//! it is private to (`<scene>~name~version`). The official plugin is the
//! bare name [`OFFICIAL_PLUGIN_NAME`] with no version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::id::SceneId;

/// Name of the built-in plugin every scene carries.
pub const OFFICIAL_PLUGIN_NAME: &str = "official";

const SEPARATOR: char = '~';

/// Identifies one version of a plugin, optionally scoped to a single scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId {
    name: String,
    version: Option<String>,
    scene: Option<SceneId>,
}

impl PluginId {
    /// Builds a plugin identifier from its parts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedId` if the name or version is invalid,
    /// or if a non-official plugin is given no version.
    pub fn new(
        name: impl Into<String>,
        version: Option<&str>,
        scene: Option<SceneId>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        if let Some(v) = version {
            validate_version(v)?;
        } else if name != OFFICIAL_PLUGIN_NAME {
            return Err(DomainError::MalformedId(format!(
                "plugin '{name}' requires a version"
            )));
        }
        if scene.is_some_and(|s| s.is_nil()) {
            return Err(DomainError::MalformedId(format!(
                "plugin '{name}' has a nil scene scope"
            )));
        }
        Ok(Self {
            name,
            version: version.map(str::to_owned),
            scene,
        })
    }

    /// The identifier of the built-in plugin.
    #[must_use]
    pub fn official() -> Self {
        Self {
            name: OFFICIAL_PLUGIN_NAME.to_owned(),
            version: None,
            scene: None,
        }
    }

    /// Plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plugin version, absent only for the official plugin.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The scene this plugin is private to, if any.
    #[must_use]
    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    /// Returns `true` for the built-in plugin.
    #[must_use]
    pub fn is_official(&self) -> bool {
        *self == Self::official()
    }

    /// Returns `true` if both identifiers name the same plugin in the same
    /// scope, regardless of version.
    #[must_use]
    pub fn name_equal(&self, other: &Self) -> bool {
        self.name == other.name && self.scene == other.scene
    }

    /// Returns `true` if this plugin is visible from `scene`: public plugins
    /// are visible everywhere, private ones only in their own scene.
    #[must_use]
    pub fn visible_from(&self, scene: SceneId) -> bool {
        self.scene.is_none_or(|s| s == scene)
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(DomainError::MalformedId(format!(
            "invalid plugin name '{name}'"
        )))
    }
}

fn validate_version(version: &str) -> Result<(), DomainError> {
    let core = version.split_once('-').map_or(version, |(core, _)| core);
    let parts: Vec<&str> = core.split('.').collect();
    let valid = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(DomainError::MalformedId(format!(
            "invalid plugin version '{version}'"
        )))
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scene) = self.scene {
            write!(f, "{scene}{SEPARATOR}")?;
        }
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "{SEPARATOR}{version}")?;
        }
        Ok(())
    }
}

impl FromStr for PluginId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        match parts.as_slice() {
            [name] => Self::new(*name, None, None),
            [name, version] => Self::new(*name, Some(*version), None),
            [scene, name, version] => Self::new(*name, Some(*version), Some(scene.parse()?)),
            _ => Err(DomainError::MalformedId(format!("invalid plugin id '{s}'"))),
        }
    }
}

impl Serialize for PluginId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PluginId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Names one capability exposed by a plugin (a widget type, a block type, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Builds an extension identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedId` if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::MalformedId(
                "extension id must not be empty".to_owned(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExtensionId> for String {
    fn from(value: ExtensionId) -> Self {
        value.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a configuration schema declared by a plugin: `<plugin>/<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertySchemaId {
    plugin: PluginId,
    key: String,
}

impl PropertySchemaId {
    /// Builds a schema identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedId` if `key` is empty or contains `/`.
    pub fn new(plugin: PluginId, key: impl Into<String>) -> Result<Self, DomainError> {
        let key = key.into();
        if key.is_empty() || key.contains('/') {
            return Err(DomainError::MalformedId(format!(
                "invalid schema key '{key}'"
            )));
        }
        Ok(Self { plugin, key })
    }

    /// Builds a schema identifier from a key known to be valid.
    pub(crate) fn new_unchecked(plugin: PluginId, key: &str) -> Self {
        Self {
            plugin,
            key: key.to_owned(),
        }
    }

    /// The plugin that declares this schema.
    #[must_use]
    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    /// The schema key within the plugin.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the same schema key under another plugin version.
    #[must_use]
    pub fn with_plugin(&self, plugin: PluginId) -> Self {
        Self {
            plugin,
            key: self.key.clone(),
        }
    }
}

impl fmt::Display for PropertySchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.plugin, self.key)
    }
}

impl FromStr for PropertySchemaId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (plugin, key) = s
            .rsplit_once('/')
            .ok_or_else(|| DomainError::MalformedId(format!("invalid schema id '{s}'")))?;
        Self::new(plugin.parse()?, key)
    }
}

impl Serialize for PropertySchemaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertySchemaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
