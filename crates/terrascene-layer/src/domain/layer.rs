//! The layer sum type.

use serde::{Deserialize, Serialize};
use terrascene_core::id::{LayerId, PropertyId, SceneId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};

use super::infobox::Infobox;

/// Attributes shared by every layer variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerBase {
    /// Layer identifier.
    pub id: LayerId,
    /// Owning scene.
    pub scene: SceneId,
    /// Display name.
    pub name: String,
    /// Whether the layer is shown.
    pub visible: bool,
    /// Plugin rendering the layer.
    pub plugin: Option<PluginId>,
    /// Extension rendering the layer.
    pub extension: Option<ExtensionId>,
    /// Layer configuration.
    pub property: Option<PropertyId>,
    /// Attached info-box.
    pub infobox: Option<Infobox>,
}

impl LayerBase {
    /// A visible, unbound layer.
    #[must_use]
    pub fn new(id: LayerId, scene: SceneId, name: impl Into<String>) -> Self {
        Self {
            id,
            scene,
            name: name.into(),
            visible: true,
            plugin: None,
            extension: None,
            property: None,
            infobox: None,
        }
    }

    /// Binds the layer to a plugin extension with its configuration.
    #[must_use]
    pub fn bound_to(
        mut self,
        plugin: PluginId,
        extension: ExtensionId,
        property: PropertyId,
    ) -> Self {
        self.plugin = Some(plugin);
        self.extension = Some(extension);
        self.property = Some(property);
        self
    }
}

/// A leaf layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerItem {
    /// Shared attributes.
    pub base: LayerBase,
}

/// A layer containing other layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroup {
    /// Shared attributes.
    pub base: LayerBase,
    /// Ordered child ids.
    children: Vec<LayerId>,
    /// Whether this is the scene's root layer.
    pub root: bool,
}

impl LayerGroup {
    /// An empty group.
    #[must_use]
    pub fn new(base: LayerBase) -> Self {
        Self {
            base,
            children: Vec::new(),
            root: false,
        }
    }

    /// The root group of a scene.
    #[must_use]
    pub fn root(id: LayerId, scene: SceneId) -> Self {
        Self {
            base: LayerBase::new(id, scene, "root"),
            children: Vec::new(),
            root: true,
        }
    }

    /// Child ids in order.
    #[must_use]
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }

    /// Returns `true` if `id` is a direct child.
    #[must_use]
    pub fn has_child(&self, id: LayerId) -> bool {
        self.children.contains(&id)
    }

    /// Appends a child. Duplicates are ignored.
    pub fn add_child(&mut self, id: LayerId) {
        if !self.has_child(id) {
            self.children.push(id);
        }
    }

    /// Detaches one child.
    pub fn remove_child(&mut self, id: LayerId) {
        self.children.retain(|c| *c != id);
    }

    /// Detaches every listed child. Returns whether any was present.
    pub fn remove_children(&mut self, ids: &[LayerId]) -> bool {
        let before = self.children.len();
        self.children.retain(|c| !ids.contains(c));
        self.children.len() != before
    }
}

/// A layer in a scene's layer tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    /// A leaf layer.
    Item(LayerItem),
    /// A group of layers.
    Group(LayerGroup),
}

impl Layer {
    /// Shared attributes.
    #[must_use]
    pub fn base(&self) -> &LayerBase {
        match self {
            Self::Item(item) => &item.base,
            Self::Group(group) => &group.base,
        }
    }

    /// Shared attributes, mutably.
    pub fn base_mut(&mut self) -> &mut LayerBase {
        match self {
            Self::Item(item) => &mut item.base,
            Self::Group(group) => &mut group.base,
        }
    }

    /// Layer identifier.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.base().id
    }

    /// Owning scene.
    #[must_use]
    pub fn scene(&self) -> SceneId {
        self.base().scene
    }

    /// The group view of this layer, if it is one.
    #[must_use]
    pub fn as_group(&self) -> Option<&LayerGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Item(_) => None,
        }
    }

    /// Returns `true` if the layer itself is rendered by `plugin`, and by
    /// `extension` when one is given.
    #[must_use]
    pub fn is_bound_to(&self, plugin: &PluginId, extension: Option<&ExtensionId>) -> bool {
        let base = self.base();
        base.plugin.as_ref() == Some(plugin)
            && extension.is_none_or(|e| base.extension.as_ref() == Some(e))
    }

    /// Returns `true` if the layer's info-box has a block from `plugin`.
    #[must_use]
    pub fn has_blocks_bound_to(&self, plugin: &PluginId, extension: Option<&ExtensionId>) -> bool {
        self.base()
            .infobox
            .as_ref()
            .is_some_and(|ib| ib.has_fields_bound_to(plugin, extension))
    }

    /// Rewrites every reference to `old` (the layer's own binding and its
    /// info-box blocks). Returns whether anything changed.
    pub fn replace_plugin(&mut self, old: &PluginId, new: &PluginId) -> bool {
        let base = self.base_mut();
        let mut changed = false;
        if base.plugin.as_ref() == Some(old) {
            base.plugin = Some(new.clone());
            changed = true;
        }
        if let Some(infobox) = base.infobox.as_mut() {
            if infobox.fields.iter().any(|f| &f.plugin == old) {
                infobox.replace_plugin(old, new);
                changed = true;
            }
        }
        changed
    }

    /// Every configuration reference owned by this layer.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyId> {
        let base = self.base();
        base.property
            .into_iter()
            .chain(base.infobox.iter().flat_map(Infobox::properties))
            .collect()
    }
}
