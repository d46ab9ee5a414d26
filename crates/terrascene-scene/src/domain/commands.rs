//! Commands for the Scene context.

use terrascene_core::command::Command;
use terrascene_core::id::{ClusterId, SceneId, WidgetId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};
use uuid::Uuid;

use super::widget_align::{WidgetAlign, WidgetLocation};

/// Command to install a plugin into a scene.
#[derive(Debug, Clone)]
pub struct InstallPlugin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The plugin to install.
    pub plugin_id: PluginId,
}

impl Command for InstallPlugin {
    fn command_type(&self) -> &'static str {
        "scene.install_plugin"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to uninstall a plugin from a scene.
#[derive(Debug, Clone)]
pub struct UninstallPlugin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The plugin to uninstall.
    pub plugin_id: PluginId,
}

impl Command for UninstallPlugin {
    fn command_type(&self) -> &'static str {
        "scene.uninstall_plugin"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace an installed plugin with another version of it.
#[derive(Debug, Clone)]
pub struct UpgradePlugin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The installed plugin.
    pub plugin_id: PluginId,
    /// The version to upgrade to.
    pub to_plugin_id: PluginId,
}

impl Command for UpgradePlugin {
    fn command_type(&self) -> &'static str {
        "scene.upgrade_plugin"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to place a new widget in a scene.
#[derive(Debug, Clone)]
pub struct AddWidget {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The plugin providing the widget.
    pub plugin_id: PluginId,
    /// The widget extension.
    pub extension_id: ExtensionId,
    /// Where to place the widget. Defaults to `inner/left/top`.
    pub location: Option<WidgetLocation>,
}

impl Command for AddWidget {
    fn command_type(&self) -> &'static str {
        "scene.add_widget"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change a widget's flags or position.
#[derive(Debug, Clone)]
pub struct UpdateWidget {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The widget to update.
    pub widget_id: WidgetId,
    /// New enabled flag, if changing.
    pub enabled: Option<bool>,
    /// New extended flag, if changing.
    pub extended: Option<bool>,
    /// New area, if moving. Defaults to the current area when only `index`
    /// is given.
    pub location: Option<WidgetLocation>,
    /// New position within the area. Negative or out-of-range appends.
    pub index: Option<isize>,
}

impl Command for UpdateWidget {
    fn command_type(&self) -> &'static str {
        "scene.update_widget"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change the alignment of one layout area.
#[derive(Debug, Clone)]
pub struct UpdateWidgetArea {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The area to update.
    pub location: WidgetLocation,
    /// The new alignment.
    pub align: WidgetAlign,
}

impl Command for UpdateWidgetArea {
    fn command_type(&self) -> &'static str {
        "scene.update_widget_area"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a widget from a scene.
#[derive(Debug, Clone)]
pub struct RemoveWidget {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The widget to remove.
    pub widget_id: WidgetId,
}

impl Command for RemoveWidget {
    fn command_type(&self) -> &'static str {
        "scene.remove_widget"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to add a clustering configuration to a scene.
#[derive(Debug, Clone)]
pub struct AddCluster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// Display name of the cluster.
    pub name: String,
}

impl Command for AddCluster {
    fn command_type(&self) -> &'static str {
        "scene.add_cluster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to rename a clustering configuration.
#[derive(Debug, Clone)]
pub struct UpdateCluster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The cluster to rename.
    pub cluster_id: ClusterId,
    /// The new display name.
    pub name: String,
}

impl Command for UpdateCluster {
    fn command_type(&self) -> &'static str {
        "scene.update_cluster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a clustering configuration.
#[derive(Debug, Clone)]
pub struct RemoveCluster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target scene.
    pub scene_id: SceneId,
    /// The cluster to remove.
    pub cluster_id: ClusterId,
}

impl Command for RemoveCluster {
    fn command_type(&self) -> &'static str {
        "scene.remove_cluster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
