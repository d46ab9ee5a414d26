//! Info-boxes and their block fields.

use serde::{Deserialize, Serialize};
use terrascene_core::id::{InfoboxFieldId, PropertyId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};

/// A block placed inside an info-box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoboxField {
    /// Field identifier.
    pub id: InfoboxFieldId,
    /// Plugin providing the block.
    pub plugin: PluginId,
    /// Block extension.
    pub extension: ExtensionId,
    /// Block configuration.
    pub property: PropertyId,
}

impl InfoboxField {
    /// Returns `true` if the block is provided by `plugin`, and by
    /// `extension` when one is given.
    #[must_use]
    pub fn is_bound_to(&self, plugin: &PluginId, extension: Option<&ExtensionId>) -> bool {
        &self.plugin == plugin && extension.is_none_or(|e| &self.extension == e)
    }
}

/// The popup panel attached to a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infobox {
    /// Configuration of the panel itself.
    pub property: PropertyId,
    /// Blocks in display order.
    pub fields: Vec<InfoboxField>,
}

impl Infobox {
    /// An empty info-box.
    #[must_use]
    pub fn new(property: PropertyId) -> Self {
        Self {
            property,
            fields: Vec::new(),
        }
    }

    /// Returns `true` if any block matches.
    #[must_use]
    pub fn has_fields_bound_to(&self, plugin: &PluginId, extension: Option<&ExtensionId>) -> bool {
        self.fields.iter().any(|f| f.is_bound_to(plugin, extension))
    }

    /// Removes every matching block and returns the configuration references
    /// they owned.
    pub fn remove_fields_bound_to(
        &mut self,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Vec<PropertyId> {
        let mut removed = Vec::new();
        self.fields.retain(|f| {
            if f.is_bound_to(plugin, extension) {
                removed.push(f.property);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Rewrites the plugin of every block provided by `old`.
    pub fn replace_plugin(&mut self, old: &PluginId, new: &PluginId) {
        for field in self.fields.iter_mut().filter(|f| &f.plugin == old) {
            field.plugin = new.clone();
        }
    }

    /// Every configuration reference this info-box owns.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyId> {
        std::iter::once(self.property)
            .chain(self.fields.iter().map(|f| f.property))
            .collect()
    }
}
