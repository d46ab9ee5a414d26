//! The scene aggregate root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terrascene_core::clock::Clock;
use terrascene_core::config::EngineConfig;
use terrascene_core::error::DomainError;
use terrascene_core::id::{LayerId, ProjectId, PropertyId, SceneId, WidgetId, WorkspaceId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};

use super::cluster::ClusterRegistry;
use super::plugins::{PluginBinding, PluginRegistry};
use super::widget_align::{WidgetAlignSystem, WidgetLocation};
use super::widgets::{Widget, WidgetRegistry};

/// One editable 3D-visualization canvas and everything bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    id: SceneId,
    workspace: WorkspaceId,
    project: ProjectId,
    root_layer: LayerId,
    property: PropertyId,
    plugins: PluginRegistry,
    widgets: WidgetRegistry,
    widget_align: WidgetAlignSystem,
    clusters: ClusterRegistry,
    updated_at: DateTime<Utc>,
}

impl Scene {
    /// Scene identifier.
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Owning workspace.
    #[must_use]
    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    /// Owning project.
    #[must_use]
    pub fn project(&self) -> ProjectId {
        self.project
    }

    /// Root of the layer tree.
    #[must_use]
    pub fn root_layer(&self) -> LayerId {
        self.root_layer
    }

    /// Scene-wide configuration.
    #[must_use]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    /// Last modification time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Installed plugins.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Installed plugins, mutably.
    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Placed widgets.
    #[must_use]
    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    /// Placed widgets, mutably.
    pub fn widgets_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.widgets
    }

    /// Widget layout.
    #[must_use]
    pub fn widget_align(&self) -> &WidgetAlignSystem {
        &self.widget_align
    }

    /// Widget layout, mutably.
    pub fn widget_align_mut(&mut self) -> &mut WidgetAlignSystem {
        &mut self.widget_align
    }

    /// Cluster configurations.
    #[must_use]
    pub fn clusters(&self) -> &ClusterRegistry {
        &self.clusters
    }

    /// Cluster configurations, mutably.
    pub fn clusters_mut(&mut self) -> &mut ClusterRegistry {
        &mut self.clusters
    }

    /// Records a modification.
    pub fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now();
    }

    /// Adds a widget and places it at the end of the area at `location`.
    /// A widget that is already placed keeps its position.
    pub fn add_widget(&mut self, widget: Widget, location: WidgetLocation) {
        let id = widget.id();
        self.widgets.add(widget);
        if self.widget_align.find(id).is_none() {
            self.widget_align.area(location).add(id, -1);
        }
    }

    /// Removes a widget from the registry and the layout, returning its
    /// configuration reference.
    pub fn remove_widget(&mut self, id: WidgetId) -> Option<PropertyId> {
        self.widget_align.remove(id);
        self.widgets.remove(id)
    }

    /// Moves a placed widget, or places an unplaced one. `location` defaults
    /// to the widget's current area (or `inner/left/top`) and `index` to the
    /// end of the area. Returns the widget's area, or `None` if the scene has
    /// no such widget.
    pub fn move_widget(
        &mut self,
        id: WidgetId,
        location: Option<WidgetLocation>,
        index: Option<isize>,
    ) -> Option<WidgetLocation> {
        if !self.widgets.has(id) {
            return None;
        }
        let index = index.unwrap_or(-1);
        match self.widget_align.find(id) {
            Some((_, current)) => {
                let target = location.unwrap_or(current);
                self.widget_align.move_widget(id, target, index);
                Some(target)
            }
            None => {
                let target = location.unwrap_or_default();
                self.widget_align.area(target).add(id, index);
                Some(target)
            }
        }
    }

    /// Removes every widget of `plugin` from the registry and the layout.
    pub fn remove_widgets_by_plugin(&mut self, plugin: &PluginId) -> Vec<PropertyId> {
        for id in self.widgets.ids_bound_to(plugin, None) {
            self.widget_align.remove(id);
        }
        self.widgets.remove_all_by_plugin(plugin)
    }

    /// Removes every widget of `plugin`'s `extension` from the registry and
    /// the layout.
    pub fn remove_widgets_by_plugin_extension(
        &mut self,
        plugin: &PluginId,
        extension: &ExtensionId,
    ) -> Vec<PropertyId> {
        for id in self.widgets.ids_bound_to(plugin, Some(extension)) {
            self.widget_align.remove(id);
        }
        self.widgets.remove_all_by_plugin_extension(plugin, extension)
    }

    /// Every configuration reference the scene owns directly.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyId> {
        std::iter::once(self.property)
            .chain(self.plugins.properties())
            .chain(self.widgets.properties())
            .chain(self.clusters.properties())
            .collect()
    }
}

/// Builds a [`Scene`], validating its identity.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    id: SceneId,
    workspace: WorkspaceId,
    project: ProjectId,
    root_layer: LayerId,
    property: PropertyId,
    official_plugin: PluginId,
    bindings: Vec<PluginBinding>,
    widgets: WidgetRegistry,
    widget_align: WidgetAlignSystem,
    clusters: ClusterRegistry,
    updated_at: Option<DateTime<Utc>>,
}

impl SceneBuilder {
    /// Starts a builder using `config` for the official plugin.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            id: SceneId::nil(),
            workspace: WorkspaceId::nil(),
            project: ProjectId::nil(),
            root_layer: LayerId::nil(),
            property: PropertyId::nil(),
            official_plugin: config.official_plugin.clone(),
            bindings: Vec::new(),
            widgets: WidgetRegistry::new(),
            widget_align: WidgetAlignSystem::new(),
            clusters: ClusterRegistry::new(),
            updated_at: None,
        }
    }

    /// Sets the scene id.
    #[must_use]
    pub fn id(mut self, id: SceneId) -> Self {
        self.id = id;
        self
    }

    /// Sets the owning workspace.
    #[must_use]
    pub fn workspace(mut self, workspace: WorkspaceId) -> Self {
        self.workspace = workspace;
        self
    }

    /// Sets the owning project.
    #[must_use]
    pub fn project(mut self, project: ProjectId) -> Self {
        self.project = project;
        self
    }

    /// Sets the root layer.
    #[must_use]
    pub fn root_layer(mut self, root_layer: LayerId) -> Self {
        self.root_layer = root_layer;
        self
    }

    /// Sets the scene-wide configuration.
    #[must_use]
    pub fn property(mut self, property: PropertyId) -> Self {
        self.property = property;
        self
    }

    /// Sets the installed plugins (the official plugin is always added).
    #[must_use]
    pub fn plugins(mut self, bindings: Vec<PluginBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Sets the widgets.
    #[must_use]
    pub fn widgets(mut self, widgets: WidgetRegistry) -> Self {
        self.widgets = widgets;
        self
    }

    /// Sets the widget layout.
    #[must_use]
    pub fn widget_align(mut self, widget_align: WidgetAlignSystem) -> Self {
        self.widget_align = widget_align;
        self
    }

    /// Sets the clusters.
    #[must_use]
    pub fn clusters(mut self, clusters: ClusterRegistry) -> Self {
        self.clusters = clusters;
        self
    }

    /// Sets the modification time.
    #[must_use]
    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the scene. Without an explicit modification time the scene is
    /// stamped with `clock`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the id, workspace, root layer,
    /// or scene property is nil.
    pub fn build(self, clock: &dyn Clock) -> Result<Scene, DomainError> {
        let missing = [
            (self.id.is_nil(), "id"),
            (self.workspace.is_nil(), "workspace"),
            (self.root_layer.is_nil(), "root layer"),
            (self.property.is_nil(), "property"),
        ]
        .into_iter()
        .find_map(|(nil, what)| nil.then_some(what));
        if let Some(what) = missing {
            return Err(DomainError::Validation(format!("scene {what} must be set")));
        }

        Ok(Scene {
            id: self.id,
            workspace: self.workspace,
            project: self.project,
            root_layer: self.root_layer,
            property: self.property,
            plugins: PluginRegistry::from_bindings(self.official_plugin, self.bindings),
            widgets: self.widgets,
            widget_align: self.widget_align,
            clusters: self.clusters,
            updated_at: self.updated_at.unwrap_or_else(|| clock.now()),
        })
    }
}
