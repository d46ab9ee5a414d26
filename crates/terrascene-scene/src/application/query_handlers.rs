//! Query handlers for the Scene context.
//!
//! This module contains query handlers that load scenes and scene locks and
//! return read-only view DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use terrascene_core::error::DomainError;
use terrascene_core::id::{
    ClusterId, LayerId, ProjectId, PropertyId, SceneId, WidgetId, WorkspaceId,
};
use terrascene_core::operator::Operator;
use terrascene_core::plugin_id::{ExtensionId, PluginId};

use crate::domain::lock::LockMode;
use crate::domain::scene::Scene;
use crate::domain::widget_align::{WidgetAlign, WidgetLocation};
use crate::repository::{SceneLockRepository, SceneRepository};

/// Read-only view of an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginBindingView {
    /// The installed plugin.
    pub plugin_id: PluginId,
    /// Its scene-level configuration.
    pub property_id: Option<PropertyId>,
}

/// Read-only view of a widget and its place in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetView {
    /// The widget identifier.
    pub widget_id: WidgetId,
    /// The plugin providing the widget.
    pub plugin_id: PluginId,
    /// The widget extension.
    pub extension_id: ExtensionId,
    /// The widget's configuration.
    pub property_id: PropertyId,
    /// Whether the widget is shown.
    pub enabled: bool,
    /// Whether the widget spans its whole area.
    pub extended: bool,
    /// The widget's area, if placed.
    pub location: Option<WidgetLocation>,
    /// The widget's position within its area, if placed.
    pub index: Option<usize>,
}

/// Read-only view of one non-empty layout area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetAreaView {
    /// The area.
    pub location: WidgetLocation,
    /// Alignment of the area's widgets.
    pub align: WidgetAlign,
    /// Widget ids in display order.
    pub widget_ids: Vec<WidgetId>,
}

/// Read-only view of a clustering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterView {
    /// The cluster identifier.
    pub cluster_id: ClusterId,
    /// Display name.
    pub name: String,
    /// The cluster's configuration.
    pub property_id: PropertyId,
}

/// Read-only view of a scene aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneView {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Root of the layer tree.
    pub root_layer_id: LayerId,
    /// Scene-wide configuration.
    pub property_id: PropertyId,
    /// Installed plugins.
    pub plugins: Vec<PluginBindingView>,
    /// Widgets in registry order.
    pub widgets: Vec<WidgetView>,
    /// Layout areas that hold widgets or a non-default alignment.
    pub widget_areas: Vec<WidgetAreaView>,
    /// Clustering configurations.
    pub clusters: Vec<ClusterView>,
    /// Current lock mode.
    pub lock_mode: LockMode,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl SceneView {
    fn from_scene(scene: &Scene, lock_mode: LockMode) -> Self {
        let layout = scene.widget_align();
        let widgets = scene
            .widgets()
            .all()
            .into_iter()
            .map(|w| {
                let placed = layout.find(w.id());
                WidgetView {
                    widget_id: w.id(),
                    plugin_id: w.plugin().clone(),
                    extension_id: w.extension().clone(),
                    property_id: w.property(),
                    enabled: w.enabled(),
                    extended: w.extended(),
                    location: placed.map(|(_, l)| l),
                    index: placed.map(|(i, _)| i),
                }
            })
            .collect();

        let widget_areas = WidgetLocation::all()
            .filter_map(|location| {
                let area = layout.area_ref(location)?;
                let shown = !area.widget_ids().is_empty() || area.align() != WidgetAlign::default();
                shown.then(|| WidgetAreaView {
                    location,
                    align: area.align(),
                    widget_ids: area.widget_ids().to_vec(),
                })
            })
            .collect();

        Self {
            scene_id: scene.id(),
            workspace_id: scene.workspace(),
            project_id: scene.project(),
            root_layer_id: scene.root_layer(),
            property_id: scene.property(),
            plugins: scene
                .plugins()
                .all()
                .into_iter()
                .map(|b| PluginBindingView {
                    plugin_id: b.plugin().clone(),
                    property_id: b.property(),
                })
                .collect(),
            widgets,
            widget_areas,
            clusters: scene
                .clusters()
                .all()
                .into_iter()
                .map(|c| ClusterView {
                    cluster_id: c.id(),
                    name: c.name().to_owned(),
                    property_id: c.property(),
                })
                .collect(),
            lock_mode,
            updated_at: scene.updated_at(),
        }
    }
}

/// Retrieves a scene by its ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the scene does not exist and
/// `DomainError::OperationDenied` if the operator cannot read its workspace.
pub async fn get_scene_by_id(
    scene_id: SceneId,
    operator: &Operator,
    scenes: &dyn SceneRepository,
    locks: &dyn SceneLockRepository,
) -> Result<SceneView, DomainError> {
    let scene = scenes
        .find_scene(scene_id)
        .await?
        .ok_or_else(|| DomainError::AggregateNotFound(scene_id.as_uuid()))?;
    operator.ensure_readable(scene.workspace())?;
    let lock_mode = locks.get_lock(scene_id).await?;
    Ok(SceneView::from_scene(&scene, lock_mode))
}

/// Reads the lock mode of one scene.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lock store fails.
pub async fn get_scene_lock(
    scene_id: SceneId,
    locks: &dyn SceneLockRepository,
) -> Result<LockMode, DomainError> {
    locks.get_lock(scene_id).await
}

/// Reads the lock modes of many scenes, in the order requested.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lock store fails.
pub async fn get_scene_locks(
    scene_ids: &[SceneId],
    locks: &dyn SceneLockRepository,
) -> Result<Vec<LockMode>, DomainError> {
    locks.get_locks(scene_ids).await
}
