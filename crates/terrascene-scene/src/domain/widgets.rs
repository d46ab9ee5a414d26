//! Widget instances placed in a scene.
//!
//! The registry never deletes configuration data itself: its removal
//! methods hand back the configuration references the removed widgets
//! owned, and the caller deletes them.

use serde::{Deserialize, Serialize};
use terrascene_core::id::{PropertyId, WidgetId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};

/// One widget instance bound to a plugin extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    id: WidgetId,
    plugin: PluginId,
    extension: ExtensionId,
    property: PropertyId,
    enabled: bool,
    extended: bool,
}

impl Widget {
    /// Creates an enabled, non-extended widget. The extension id is
    /// validated (non-empty) when it is constructed.
    #[must_use]
    pub fn new(
        id: WidgetId,
        plugin: PluginId,
        extension: ExtensionId,
        property: PropertyId,
    ) -> Self {
        Self {
            id,
            plugin,
            extension,
            property,
            enabled: true,
            extended: false,
        }
    }

    /// Widget identifier.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Providing plugin.
    #[must_use]
    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    /// Providing extension.
    #[must_use]
    pub fn extension(&self) -> &ExtensionId {
        &self.extension
    }

    /// Widget configuration.
    #[must_use]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    /// Whether the widget is shown.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the widget spans its whole section.
    #[must_use]
    pub fn extended(&self) -> bool {
        self.extended
    }

    /// Shows or hides the widget.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets whether the widget spans its whole section.
    pub fn set_extended(&mut self, extended: bool) {
        self.extended = extended;
    }

    fn is_bound_to(&self, plugin: &PluginId, extension: Option<&ExtensionId>) -> bool {
        &self.plugin == plugin && extension.is_none_or(|e| &self.extension == e)
    }
}

/// The widgets of one scene, unique by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRegistry {
    widgets: Vec<Widget>,
}

impl WidgetRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a widget with `id` exists.
    #[must_use]
    pub fn has(&self, id: WidgetId) -> bool {
        self.widgets.iter().any(|w| w.id == id)
    }

    /// Looks up a widget.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Looks up a widget, mutably.
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Every widget, copied.
    #[must_use]
    pub fn all(&self) -> Vec<Widget> {
        self.widgets.clone()
    }

    /// Ids of the widgets bound to `plugin` (and `extension`, when given).
    #[must_use]
    pub fn ids_bound_to(
        &self,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .filter(|w| w.is_bound_to(plugin, extension))
            .map(Widget::id)
            .collect()
    }

    /// Adds a widget. Ignored if one with the same id exists.
    pub fn add(&mut self, widget: Widget) {
        if self.has(widget.id) {
            return;
        }
        self.widgets.push(widget);
    }

    /// Removes a widget and returns its configuration reference.
    pub fn remove(&mut self, id: WidgetId) -> Option<PropertyId> {
        let index = self.widgets.iter().position(|w| w.id == id)?;
        Some(self.widgets.remove(index).property)
    }

    /// Removes every widget of `plugin` and returns their configuration
    /// references.
    pub fn remove_all_by_plugin(&mut self, plugin: &PluginId) -> Vec<PropertyId> {
        self.remove_bound_to(plugin, None)
    }

    /// Removes every widget of `plugin`'s `extension` and returns their
    /// configuration references.
    pub fn remove_all_by_plugin_extension(
        &mut self,
        plugin: &PluginId,
        extension: &ExtensionId,
    ) -> Vec<PropertyId> {
        self.remove_bound_to(plugin, Some(extension))
    }

    fn remove_bound_to(
        &mut self,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Vec<PropertyId> {
        let mut removed = Vec::new();
        self.widgets.retain(|w| {
            if w.is_bound_to(plugin, extension) {
                removed.push(w.property);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Rewrites the plugin of every widget provided by `old`.
    pub fn replace_plugin(&mut self, old: &PluginId, new: &PluginId) {
        for widget in self.widgets.iter_mut().filter(|w| &w.plugin == old) {
            widget.plugin = new.clone();
        }
    }

    /// Every configuration reference.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyId> {
        self.widgets.iter().map(Widget::property).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: &str) -> PluginId {
        raw.parse().unwrap()
    }

    fn widget(plugin: &str, extension: &str) -> Widget {
        Widget::new(
            WidgetId::new(),
            pid(plugin),
            ExtensionId::new(extension).unwrap(),
            PropertyId::new(),
        )
    }

    #[test]
    fn test_add_ignores_duplicate_ids() {
        let mut registry = WidgetRegistry::new();
        let w = widget("p~1.0.0", "menu");
        let mut dup = w.clone();
        dup.set_enabled(false);

        registry.add(w.clone());
        registry.add(dup);

        assert_eq!(registry.all(), vec![w]);
    }

    #[test]
    fn test_remove_all_by_plugin_extension_returns_properties() {
        // Arrange
        let mut registry = WidgetRegistry::new();
        let menu = widget("p~1.0.0", "menu");
        let search = widget("p~1.0.0", "search");
        let other = widget("q~1.0.0", "menu");
        registry.add(menu.clone());
        registry.add(search.clone());
        registry.add(other.clone());

        // Act
        let removed = registry
            .remove_all_by_plugin_extension(&pid("p~1.0.0"), &ExtensionId::new("menu").unwrap());

        // Assert
        assert_eq!(removed, vec![menu.property()]);
        assert_eq!(registry.all(), vec![search, other]);
    }

    #[test]
    fn test_remove_all_by_plugin_returns_properties() {
        let mut registry = WidgetRegistry::new();
        let a = widget("p~1.0.0", "menu");
        let b = widget("p~1.0.0", "search");
        registry.add(a.clone());
        registry.add(b.clone());

        let removed = registry.remove_all_by_plugin(&pid("p~1.0.0"));

        assert_eq!(removed, vec![a.property(), b.property()]);
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_replace_plugin_rewrites_in_place() {
        let mut registry = WidgetRegistry::new();
        let w = widget("p~1.0.0", "menu");
        registry.add(w.clone());

        registry.replace_plugin(&pid("p~1.0.0"), &pid("p~1.1.0"));

        let upgraded = registry.widget(w.id()).unwrap();
        assert_eq!(upgraded.plugin(), &pid("p~1.1.0"));
        assert_eq!(upgraded.property(), w.property());
    }

    #[test]
    fn test_remove_returns_property_of_removed_widget() {
        let mut registry = WidgetRegistry::new();
        let w = widget("p~1.0.0", "menu");
        registry.add(w.clone());

        assert_eq!(registry.remove(w.id()), Some(w.property()));
        assert_eq!(registry.remove(w.id()), None);
        assert!(registry.properties().is_empty());
    }
}
