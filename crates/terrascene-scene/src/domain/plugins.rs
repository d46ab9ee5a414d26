//! The set of plugins installed into a scene.
//!
//! Every mutation is a silent no-op on misuse (duplicate add, removal of the
//! official plugin, upgrade of a plugin that is not installed). Callers that
//! need strict semantics pre-check with [`PluginRegistry::has`] and
//! [`PluginRegistry::has_by_name`].

use serde::{Deserialize, Serialize};
use terrascene_core::id::PropertyId;
use terrascene_core::plugin_id::PluginId;

/// An installed plugin and its optional scene-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBinding {
    plugin: PluginId,
    property: Option<PropertyId>,
}

impl PluginBinding {
    /// Binds `plugin` with an optional configuration instance.
    #[must_use]
    pub fn new(plugin: PluginId, property: Option<PropertyId>) -> Self {
        Self { plugin, property }
    }

    /// The installed plugin.
    #[must_use]
    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    /// The plugin's scene-level configuration.
    #[must_use]
    pub fn property(&self) -> Option<PropertyId> {
        self.property
    }
}

/// Plugins installed into one scene, at most one binding per exact id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRegistry {
    official: PluginId,
    bindings: Vec<PluginBinding>,
}

impl PluginRegistry {
    /// A registry holding only the official plugin.
    #[must_use]
    pub fn new(official: PluginId) -> Self {
        Self {
            bindings: vec![PluginBinding::new(official.clone(), None)],
            official,
        }
    }

    /// A registry restored from stored bindings. Duplicates are dropped and
    /// the official plugin is bound first if it was missing; a stored official
    /// binding keeps its configuration.
    #[must_use]
    pub fn from_bindings(official: PluginId, bindings: Vec<PluginBinding>) -> Self {
        let mut registry = Self {
            official,
            bindings: Vec::with_capacity(bindings.len() + 1),
        };
        for binding in bindings {
            if registry.has(binding.plugin()) {
                continue;
            }
            registry.bindings.push(binding);
        }
        if !registry.has(&registry.official) {
            let official = PluginBinding::new(registry.official.clone(), None);
            registry.bindings.insert(0, official);
        }
        registry
    }

    /// The plugin this registry treats as immutable.
    #[must_use]
    pub fn official(&self) -> &PluginId {
        &self.official
    }

    /// Returns `true` if exactly `id` is installed.
    #[must_use]
    pub fn has(&self, id: &PluginId) -> bool {
        self.bindings.iter().any(|b| &b.plugin == id)
    }

    /// Returns `true` if any version of `id`'s plugin is installed.
    #[must_use]
    pub fn has_by_name(&self, id: &PluginId) -> bool {
        self.bindings.iter().any(|b| b.plugin.name_equal(id))
    }

    /// The installed binding whose name matches `id`, whatever its version.
    #[must_use]
    pub fn find_by_name(&self, id: &PluginId) -> Option<&PluginBinding> {
        self.bindings.iter().find(|b| b.plugin.name_equal(id))
    }

    /// The binding for exactly `id`.
    #[must_use]
    pub fn binding(&self, id: &PluginId) -> Option<&PluginBinding> {
        self.bindings.iter().find(|b| &b.plugin == id)
    }

    /// The scene-level configuration of `id`.
    #[must_use]
    pub fn config_of(&self, id: &PluginId) -> Option<PropertyId> {
        self.binding(id).and_then(PluginBinding::property)
    }

    /// Installs a plugin. Ignored if it is already present or is the
    /// official plugin.
    pub fn add(&mut self, binding: PluginBinding) {
        if binding.plugin == self.official || self.has(&binding.plugin) {
            return;
        }
        self.bindings.push(binding);
    }

    /// Uninstalls a plugin. Ignored for the official plugin.
    pub fn remove(&mut self, id: &PluginId) {
        if *id == self.official {
            return;
        }
        self.bindings.retain(|b| &b.plugin != id);
    }

    /// Replaces the id of an installed plugin, keeping its configuration.
    pub fn upgrade(&mut self, from: &PluginId, to: &PluginId) {
        self.upgrade_with_property(from, to, None, false);
    }

    /// Replaces the id of an installed plugin. The configuration becomes
    /// `property` if given; otherwise it is kept, or cleared when
    /// `delete_property` is set. Ignored for the official plugin and for
    /// plugins that are not installed.
    pub fn upgrade_with_property(
        &mut self,
        from: &PluginId,
        to: &PluginId,
        property: Option<PropertyId>,
        delete_property: bool,
    ) {
        if *from == self.official || *to == self.official || self.has(to) {
            return;
        }
        let Some(binding) = self.bindings.iter_mut().find(|b| &b.plugin == from) else {
            return;
        };
        let kept = if delete_property { None } else { binding.property };
        *binding = PluginBinding::new(to.clone(), property.or(kept));
    }

    /// Every binding, copied.
    #[must_use]
    pub fn all(&self) -> Vec<PluginBinding> {
        self.bindings.clone()
    }

    /// Every scene-level configuration reference.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyId> {
        self.bindings.iter().filter_map(PluginBinding::property).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: &str) -> PluginId {
        raw.parse().unwrap()
    }

    #[test]
    fn test_new_registry_holds_official_plugin() {
        let registry = PluginRegistry::new(PluginId::official());

        assert!(registry.has(&PluginId::official()));
        assert_eq!(registry.all().len(), 1);
    }

    #[test]
    fn test_from_bindings_keeps_stored_official_configuration() {
        // Arrange
        let official_property = PropertyId::new();
        let stored = vec![
            PluginBinding::new(pid("p~1.0.0"), None),
            PluginBinding::new(PluginId::official(), Some(official_property)),
            PluginBinding::new(pid("p~1.0.0"), Some(PropertyId::new())),
        ];

        // Act
        let registry = PluginRegistry::from_bindings(PluginId::official(), stored);

        // Assert
        assert_eq!(registry.all().len(), 2);
        assert_eq!(registry.config_of(&PluginId::official()), Some(official_property));
        assert_eq!(registry.config_of(&pid("p~1.0.0")), None);
    }

    #[test]
    fn test_from_bindings_adds_missing_official_first() {
        let stored = vec![PluginBinding::new(pid("p~1.0.0"), None)];

        let registry = PluginRegistry::from_bindings(PluginId::official(), stored);

        let ids: Vec<PluginId> = registry.all().into_iter().map(|b| b.plugin().clone()).collect();
        assert_eq!(ids, vec![PluginId::official(), pid("p~1.0.0")]);
    }

    #[test]
    fn test_add_ignores_duplicates_and_official() {
        // Arrange
        let mut registry = PluginRegistry::new(PluginId::official());
        let property = PropertyId::new();

        // Act
        registry.add(PluginBinding::new(pid("p~1.0.0"), Some(property)));
        registry.add(PluginBinding::new(pid("p~1.0.0"), None));
        registry.add(PluginBinding::new(PluginId::official(), Some(PropertyId::new())));

        // Assert
        assert_eq!(registry.all().len(), 2);
        assert_eq!(registry.config_of(&pid("p~1.0.0")), Some(property));
        assert_eq!(registry.config_of(&PluginId::official()), None);
    }

    #[test]
    fn test_add_accepts_other_versions() {
        let mut registry = PluginRegistry::new(PluginId::official());

        registry.add(PluginBinding::new(pid("p~1.0.0"), None));
        registry.add(PluginBinding::new(pid("p~2.0.0"), None));

        assert!(registry.has(&pid("p~2.0.0")));
        assert_eq!(registry.all().len(), 3);
    }

    #[test]
    fn test_has_by_name_ignores_version() {
        let mut registry = PluginRegistry::new(PluginId::official());
        registry.add(PluginBinding::new(pid("p~1.0.0"), None));

        assert!(registry.has_by_name(&pid("p~9.9.9")));
        assert!(!registry.has(&pid("p~9.9.9")));
        assert!(!registry.has_by_name(&pid("q~1.0.0")));
    }

    #[test]
    fn test_remove_never_drops_official() {
        let mut registry = PluginRegistry::new(PluginId::official());
        registry.add(PluginBinding::new(pid("p~1.0.0"), None));

        registry.remove(&PluginId::official());
        registry.remove(&pid("p~1.0.0"));

        assert!(registry.has(&PluginId::official()));
        assert!(!registry.has(&pid("p~1.0.0")));
    }

    #[test]
    fn test_upgrade_keeps_property() {
        let mut registry = PluginRegistry::new(PluginId::official());
        let property = PropertyId::new();
        registry.add(PluginBinding::new(pid("p~1.0.0"), Some(property)));

        registry.upgrade(&pid("p~1.0.0"), &pid("p~1.0.1"));

        assert!(!registry.has(&pid("p~1.0.0")));
        assert_eq!(registry.config_of(&pid("p~1.0.1")), Some(property));
    }

    #[test]
    fn test_upgrade_with_property_replaces_or_clears() {
        let mut registry = PluginRegistry::new(PluginId::official());
        let old_property = PropertyId::new();
        let new_property = PropertyId::new();
        registry.add(PluginBinding::new(pid("p~1.0.0"), Some(old_property)));
        registry.add(PluginBinding::new(pid("q~1.0.0"), Some(PropertyId::new())));

        registry.upgrade_with_property(&pid("p~1.0.0"), &pid("p~2.0.0"), Some(new_property), true);
        registry.upgrade_with_property(&pid("q~1.0.0"), &pid("q~2.0.0"), None, true);

        assert_eq!(registry.config_of(&pid("p~2.0.0")), Some(new_property));
        assert!(registry.has(&pid("q~2.0.0")));
        assert_eq!(registry.config_of(&pid("q~2.0.0")), None);
    }

    #[test]
    fn test_upgrade_ignores_official_and_missing() {
        let mut registry = PluginRegistry::new(PluginId::official());
        let before = registry.clone();

        registry.upgrade(&PluginId::official(), &pid("p~1.0.0"));
        registry.upgrade(&pid("x~1.0.0"), &pid("x~2.0.0"));

        assert_eq!(registry, before);
    }

    #[test]
    fn test_all_returns_a_copy() {
        let mut registry = PluginRegistry::new(PluginId::official());
        let mut copy = registry.all();
        copy.clear();

        registry.add(PluginBinding::new(pid("p~1.0.0"), None));

        assert!(copy.is_empty());
        assert_eq!(registry.all().len(), 2);
    }
}
