//! Domain events for the Scene context.

use serde::{Deserialize, Serialize};
use terrascene_core::clock::Clock;
use terrascene_core::event::{DomainEvent, EventMetadata};
use terrascene_core::id::{ClusterId, PropertyId, SceneId, WidgetId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};
use uuid::Uuid;

use super::widget_align::{WidgetAlign, WidgetLocation};

/// Emitted when a plugin is installed into a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInstalled {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The installed plugin.
    pub plugin_id: PluginId,
    /// The plugin's scene-level configuration, if created.
    pub property_id: Option<PropertyId>,
}

/// Emitted when a plugin is uninstalled from a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginUninstalled {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The removed plugin.
    pub plugin_id: PluginId,
    /// Number of configuration instances deleted with it.
    pub removed_properties: usize,
}

/// Emitted when an installed plugin is replaced by another version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginUpgraded {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The previously installed version.
    pub from: PluginId,
    /// The newly installed version.
    pub to: PluginId,
    /// Extensions dropped by the upgrade.
    pub deleted_extensions: Vec<ExtensionId>,
}

/// Emitted when a widget is placed in a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetAdded {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The new widget.
    pub widget_id: WidgetId,
    /// The plugin providing it.
    pub plugin_id: PluginId,
    /// Its extension.
    pub extension_id: ExtensionId,
    /// Where it was placed.
    pub location: WidgetLocation,
}

/// Emitted when a widget's flags or position change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetUpdated {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The updated widget.
    pub widget_id: WidgetId,
    /// Current enabled flag.
    pub enabled: bool,
    /// Current extended flag.
    pub extended: bool,
    /// Current area, if the widget is placed.
    pub location: Option<WidgetLocation>,
}

/// Emitted when a layout area's alignment changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetAreaUpdated {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The updated area.
    pub location: WidgetLocation,
    /// The new alignment.
    pub align: WidgetAlign,
}

/// Emitted when a widget is removed from a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRemoved {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The removed widget.
    pub widget_id: WidgetId,
}

/// Emitted when a clustering configuration is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAdded {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The new cluster.
    pub cluster_id: ClusterId,
    /// Its display name.
    pub name: String,
}

/// Emitted when a clustering configuration is renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRenamed {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The renamed cluster.
    pub cluster_id: ClusterId,
    /// Its new display name.
    pub name: String,
}

/// Emitted when a clustering configuration is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRemoved {
    /// The scene identifier.
    pub scene_id: SceneId,
    /// The removed cluster.
    pub cluster_id: ClusterId,
}

/// Event payload variants for the Scene context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneEventKind {
    /// A plugin was installed.
    PluginInstalled(PluginInstalled),
    /// A plugin was uninstalled.
    PluginUninstalled(PluginUninstalled),
    /// A plugin was upgraded.
    PluginUpgraded(PluginUpgraded),
    /// A widget was added.
    WidgetAdded(WidgetAdded),
    /// A widget was updated.
    WidgetUpdated(WidgetUpdated),
    /// A layout area was updated.
    WidgetAreaUpdated(WidgetAreaUpdated),
    /// A widget was removed.
    WidgetRemoved(WidgetRemoved),
    /// A cluster was added.
    ClusterAdded(ClusterAdded),
    /// A cluster was renamed.
    ClusterRenamed(ClusterRenamed),
    /// A cluster was removed.
    ClusterRemoved(ClusterRemoved),
}

/// Domain event envelope for the Scene context.
#[derive(Debug, Clone)]
pub struct SceneEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SceneEventKind,
}

impl SceneEvent {
    /// Wraps `kind` with metadata for `scene_id`.
    #[must_use]
    pub fn new(
        scene_id: SceneId,
        correlation_id: Uuid,
        kind: SceneEventKind,
        clock: &dyn Clock,
    ) -> Self {
        let event_type = event_type_of(&kind);
        Self {
            metadata: EventMetadata::new(event_type, scene_id.as_uuid(), correlation_id, clock),
            kind,
        }
    }
}

fn event_type_of(kind: &SceneEventKind) -> &'static str {
    match kind {
        SceneEventKind::PluginInstalled(_) => "scene.plugin_installed",
        SceneEventKind::PluginUninstalled(_) => "scene.plugin_uninstalled",
        SceneEventKind::PluginUpgraded(_) => "scene.plugin_upgraded",
        SceneEventKind::WidgetAdded(_) => "scene.widget_added",
        SceneEventKind::WidgetUpdated(_) => "scene.widget_updated",
        SceneEventKind::WidgetAreaUpdated(_) => "scene.widget_area_updated",
        SceneEventKind::WidgetRemoved(_) => "scene.widget_removed",
        SceneEventKind::ClusterAdded(_) => "scene.cluster_added",
        SceneEventKind::ClusterRenamed(_) => "scene.cluster_renamed",
        SceneEventKind::ClusterRemoved(_) => "scene.cluster_removed",
    }
}

impl DomainEvent for SceneEvent {
    fn event_type(&self) -> &'static str {
        event_type_of(&self.kind)
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use terrascene_test_support::FixedClock;

    #[test]
    fn test_new_fills_metadata_from_scene_and_clock() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let scene_id = SceneId::new();
        let correlation_id = Uuid::new_v4();
        let kind = SceneEventKind::WidgetRemoved(WidgetRemoved {
            scene_id,
            widget_id: WidgetId::new(),
        });

        // Act
        let event = SceneEvent::new(scene_id, correlation_id, kind, &FixedClock(now));

        // Assert
        assert_eq!(event.event_type(), "scene.widget_removed");
        assert_eq!(event.metadata().event_type, "scene.widget_removed");
        assert_eq!(event.metadata().aggregate_id, scene_id.as_uuid());
        assert_eq!(event.metadata().correlation_id, correlation_id);
        assert_eq!(event.metadata().occurred_at, now);
    }

    #[test]
    fn test_payload_carries_plugin_ids_as_text() {
        let scene_id = SceneId::new();
        let kind = SceneEventKind::PluginInstalled(PluginInstalled {
            scene_id,
            plugin_id: "charts~1.0.0".parse().unwrap(),
            property_id: None,
        });
        let event = SceneEvent::new(scene_id, Uuid::new_v4(), kind, &FixedClock(Utc::now()));

        let payload = event.to_payload();

        assert_eq!(payload["PluginInstalled"]["plugin_id"], "charts~1.0.0");
    }
}
