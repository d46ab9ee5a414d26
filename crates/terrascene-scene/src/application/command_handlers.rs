//! Command handlers for the Scene context.
//!
//! Each handler checks or takes the scene lock, opens a storage transaction,
//! loads the scene, authorizes the operator, applies the change across every
//! affected store, and commits. Any error before the commit drops the
//! transaction, which rolls every write back.

use terrascene_core::error::DomainError;
use terrascene_core::id::{ClusterId, PropertyId, SceneId, WidgetId};
use terrascene_core::operator::Operator;
use terrascene_core::plugin_id::PluginId;
use terrascene_plugin::domain::diff::ManifestDiff;
use terrascene_plugin::domain::manifest::{ExtensionType, Manifest};
use terrascene_property::domain::property::Property;
use tracing::{info, instrument};
use uuid::Uuid;

use super::plugin_migrator::{
    DeletionBatch, migrate_plugin, remove_blocks_bound_to, remove_layers_bound_to,
};
use super::scene_lock::{check_scene_lock, with_scene_lock};
use super::services::SceneServices;
use crate::domain::cluster::Cluster;
use crate::domain::commands::{
    AddCluster, AddWidget, InstallPlugin, RemoveCluster, RemoveWidget, UninstallPlugin,
    UpdateCluster, UpdateWidget, UpdateWidgetArea, UpgradePlugin,
};
use crate::domain::events::{
    ClusterAdded, ClusterRemoved, ClusterRenamed, PluginInstalled, PluginUninstalled,
    PluginUpgraded, SceneEvent, SceneEventKind, WidgetAdded, WidgetAreaUpdated, WidgetRemoved,
    WidgetUpdated,
};
use crate::domain::lock::LockMode;
use crate::domain::plugins::PluginBinding;
use crate::domain::scene::Scene;
use crate::domain::widgets::Widget;

/// Loads a scene the operator may modify.
async fn load_writable_scene(
    scene_id: SceneId,
    operator: &Operator,
    services: &SceneServices,
) -> Result<Scene, DomainError> {
    let scene = services
        .scenes
        .find_scene(scene_id)
        .await?
        .ok_or_else(|| DomainError::AggregateNotFound(scene_id.as_uuid()))?;
    operator.ensure_writable(scene.workspace())?;
    Ok(scene)
}

/// Loads a plugin manifest as seen from `scene_id`.
async fn load_manifest(
    plugin_id: &PluginId,
    scene_id: SceneId,
    services: &SceneServices,
) -> Result<Manifest, DomainError> {
    services
        .plugins
        .find_plugin(plugin_id, Some(scene_id))
        .await?
        .ok_or_else(|| DomainError::PluginNotFound(plugin_id.clone()))
}

async fn save_scene(scene: &mut Scene, services: &SceneServices) -> Result<(), DomainError> {
    scene.touch(services.clock.as_ref());
    services.scenes.save_scene(scene).await
}

fn event(
    scene_id: SceneId,
    correlation_id: Uuid,
    kind: SceneEventKind,
    services: &SceneServices,
) -> SceneEvent {
    SceneEvent::new(scene_id, correlation_id, kind, services.clock.as_ref())
}

/// Handles the `InstallPlugin` command: binds a plugin to the scene and
/// creates its scene-level configuration when the plugin declares one.
///
/// Installing the official plugin again is a no-op.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if another edit holds the scene,
/// `DomainError::PluginNotFound` if the plugin is missing or private to
/// another scene, and `DomainError::PluginAlreadyInstalled` if any version of
/// the plugin is already installed.
#[instrument(skip_all, fields(scene_id = %command.scene_id, plugin_id = %command.plugin_id))]
pub async fn handle_install_plugin(
    command: &InstallPlugin,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    with_scene_lock(&services.locks, command.scene_id, LockMode::Pending, || {
        install_plugin(command, operator, services)
    })
    .await
}

async fn install_plugin(
    command: &InstallPlugin,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;
    let plugin_id = &command.plugin_id;

    if !plugin_id.visible_from(scene.id()) {
        return Err(DomainError::PluginNotFound(plugin_id.clone()));
    }
    if plugin_id == scene.plugins().official() {
        info!(correlation_id = %command.correlation_id, "official plugin already installed");
        let kind = SceneEventKind::PluginInstalled(PluginInstalled {
            scene_id: scene.id(),
            plugin_id: plugin_id.clone(),
            property_id: scene.plugins().config_of(plugin_id),
        });
        return Ok(event(scene.id(), command.correlation_id, kind, services));
    }
    if scene.plugins().has_by_name(plugin_id) {
        return Err(DomainError::PluginAlreadyInstalled(plugin_id.clone()));
    }

    let manifest = load_manifest(plugin_id, scene.id(), services).await?;
    let property_id = match &manifest.schema {
        Some(schema) => {
            let property = Property::new(PropertyId::new(), scene.id(), schema.id.clone());
            services.properties.save_property(&property).await?;
            Some(property.id())
        }
        None => None,
    };
    scene
        .plugins_mut()
        .add(PluginBinding::new(manifest.id.clone(), property_id));
    save_scene(&mut scene, services).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, "plugin installed");
    let kind = SceneEventKind::PluginInstalled(PluginInstalled {
        scene_id: scene.id(),
        plugin_id: manifest.id,
        property_id,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `UninstallPlugin` command: unbinds the plugin and deletes its
/// widgets, layers, blocks, and their configuration. A plugin private to the
/// scene is also deleted from the plugin store together with its schemas.
///
/// # Errors
///
/// Returns `DomainError::CannotUninstallOfficialPlugin` for the official
/// plugin, `DomainError::SceneLocked` if another edit holds the scene, and
/// `DomainError::PluginNotInstalled` if the plugin is not installed.
#[instrument(skip_all, fields(scene_id = %command.scene_id, plugin_id = %command.plugin_id))]
pub async fn handle_uninstall_plugin(
    command: &UninstallPlugin,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    if command.plugin_id == services.config.official_plugin {
        return Err(DomainError::CannotUninstallOfficialPlugin);
    }
    with_scene_lock(&services.locks, command.scene_id, LockMode::Pending, || {
        uninstall_plugin(command, operator, services)
    })
    .await
}

async fn uninstall_plugin(
    command: &UninstallPlugin,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;
    let plugin_id = &command.plugin_id;
    if !scene.plugins().has(plugin_id) {
        return Err(DomainError::PluginNotInstalled(plugin_id.clone()));
    }

    let mut doomed = DeletionBatch::default();
    doomed.extend(scene.plugins().config_of(plugin_id));
    scene.plugins_mut().remove(plugin_id);
    doomed.extend(scene.remove_widgets_by_plugin(plugin_id));

    let removed = remove_layers_bound_to(scene.id(), plugin_id, None, services).await?;
    doomed.extend(removed.properties);
    doomed.extend(remove_blocks_bound_to(scene.id(), plugin_id, None, services).await?);

    save_scene(&mut scene, services).await?;
    let doomed = doomed.into_ids();
    services.properties.remove_properties(&doomed).await?;

    if plugin_id.scene() == Some(scene.id()) {
        if let Some(manifest) = services.plugins.find_plugin(plugin_id, Some(scene.id())).await? {
            services.schemas.remove_schemas(&manifest.schema_ids()).await?;
        }
        services.plugins.remove_plugin(plugin_id).await?;
    }
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        removed_layers = removed.layers.len(),
        removed_properties = doomed.len(),
        "plugin uninstalled"
    );
    let kind = SceneEventKind::PluginUninstalled(PluginUninstalled {
        scene_id: scene.id(),
        plugin_id: plugin_id.clone(),
        removed_properties: doomed.len(),
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `UpgradePlugin` command: replaces an installed plugin with
/// another version of it and migrates every piece of scene data bound to it.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is not free,
/// `DomainError::PluginNotInstalled` if the source plugin is not installed,
/// `DomainError::InvalidPluginUpgrade` if the target is not another version
/// of the same plugin, and `DomainError::PluginNotFound` if either manifest is
/// missing.
#[instrument(
    skip_all,
    fields(scene_id = %command.scene_id, from = %command.plugin_id, to = %command.to_plugin_id)
)]
pub async fn handle_upgrade_plugin(
    command: &UpgradePlugin,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    with_scene_lock(
        &services.locks,
        command.scene_id,
        LockMode::PluginUpgrading,
        || upgrade_plugin(command, operator, services),
    )
    .await
}

async fn upgrade_plugin(
    command: &UpgradePlugin,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;
    let (from, to) = (&command.plugin_id, &command.to_plugin_id);

    if !scene.plugins().has(from) {
        return Err(DomainError::PluginNotInstalled(from.clone()));
    }
    if from == scene.plugins().official() || !from.name_equal(to) || from == to {
        return Err(DomainError::InvalidPluginUpgrade {
            from: from.clone(),
            to: to.clone(),
        });
    }

    let old = load_manifest(from, scene.id(), services).await?;
    let new = load_manifest(to, scene.id(), services).await?;
    let diff = ManifestDiff::between(&old, &new);
    let outcome = migrate_plugin(&mut scene, &diff, services).await?;
    tx.commit().await?;

    info!(
        correlation_id = %command.correlation_id,
        removed_layers = outcome.removed_layers.len(),
        removed_properties = outcome.removed_properties.len(),
        migrated_properties = outcome.migrated_properties,
        "plugin upgraded"
    );
    let kind = SceneEventKind::PluginUpgraded(PluginUpgraded {
        scene_id: scene.id(),
        from: diff.from.clone(),
        to: diff.to.clone(),
        deleted_extensions: diff
            .deleted_extensions
            .iter()
            .map(|d| d.extension.clone())
            .collect(),
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `AddWidget` command: creates a widget of an installed
/// plugin's widget extension, with a fresh configuration, and places it in
/// the layout.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked,
/// `DomainError::PluginNotInstalled` if the plugin is not installed,
/// `DomainError::ExtensionNotFound` if the plugin lacks the extension, and
/// `DomainError::InvalidExtensionType` if it is not a widget extension.
#[instrument(
    skip_all,
    fields(
        scene_id = %command.scene_id,
        plugin_id = %command.plugin_id,
        extension_id = %command.extension_id
    )
)]
pub async fn handle_add_widget(
    command: &AddWidget,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    if !scene.plugins().has(&command.plugin_id) {
        return Err(DomainError::PluginNotInstalled(command.plugin_id.clone()));
    }
    let manifest = load_manifest(&command.plugin_id, scene.id(), services).await?;
    let extension = manifest.extension(&command.extension_id).ok_or_else(|| {
        DomainError::ExtensionNotFound {
            plugin: command.plugin_id.clone(),
            extension: command.extension_id.clone(),
        }
    })?;
    if extension.extension_type != ExtensionType::Widget {
        return Err(DomainError::InvalidExtensionType {
            extension: extension.id.clone(),
            expected: ExtensionType::Widget.as_str(),
        });
    }

    let property = Property::new(PropertyId::new(), scene.id(), extension.schema.id.clone());
    services.properties.save_property(&property).await?;

    let widget = Widget::new(
        WidgetId::new(),
        command.plugin_id.clone(),
        extension.id.clone(),
        property.id(),
    );
    let widget_id = widget.id();
    let location = command.location.unwrap_or_default();
    scene.add_widget(widget, location);
    save_scene(&mut scene, services).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, widget_id = %widget_id, "widget added");
    let kind = SceneEventKind::WidgetAdded(WidgetAdded {
        scene_id: scene.id(),
        widget_id,
        plugin_id: command.plugin_id.clone(),
        extension_id: command.extension_id.clone(),
        location,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `UpdateWidget` command: changes a widget's flags and, when a
/// location or index is given, its position in the layout.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked and
/// `DomainError::WidgetNotFound` if the scene has no such widget.
#[instrument(skip_all, fields(scene_id = %command.scene_id, widget_id = %command.widget_id))]
pub async fn handle_update_widget(
    command: &UpdateWidget,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    let widget = scene
        .widgets_mut()
        .widget_mut(command.widget_id)
        .ok_or(DomainError::WidgetNotFound(command.widget_id))?;
    if let Some(enabled) = command.enabled {
        widget.set_enabled(enabled);
    }
    if let Some(extended) = command.extended {
        widget.set_extended(extended);
    }
    let (enabled, extended) = (widget.enabled(), widget.extended());

    if command.location.is_some() || command.index.is_some() {
        scene.move_widget(command.widget_id, command.location, command.index);
    }
    let location = scene.widget_align().find(command.widget_id).map(|(_, l)| l);
    save_scene(&mut scene, services).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, "widget updated");
    let kind = SceneEventKind::WidgetUpdated(WidgetUpdated {
        scene_id: scene.id(),
        widget_id: command.widget_id,
        enabled,
        extended,
        location,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `UpdateWidgetArea` command: changes the alignment of one
/// layout area.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked.
#[instrument(skip_all, fields(scene_id = %command.scene_id, location = %command.location))]
pub async fn handle_update_widget_area(
    command: &UpdateWidgetArea,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    scene
        .widget_align_mut()
        .area(command.location)
        .set_align(command.align);
    save_scene(&mut scene, services).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, "widget area updated");
    let kind = SceneEventKind::WidgetAreaUpdated(WidgetAreaUpdated {
        scene_id: scene.id(),
        location: command.location,
        align: command.align,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `RemoveWidget` command: removes the widget from the registry
/// and the layout and deletes its configuration.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked and
/// `DomainError::WidgetNotFound` if the scene has no such widget.
#[instrument(skip_all, fields(scene_id = %command.scene_id, widget_id = %command.widget_id))]
pub async fn handle_remove_widget(
    command: &RemoveWidget,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    let property = scene
        .remove_widget(command.widget_id)
        .ok_or(DomainError::WidgetNotFound(command.widget_id))?;
    save_scene(&mut scene, services).await?;
    services.properties.remove_property(property).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, "widget removed");
    let kind = SceneEventKind::WidgetRemoved(WidgetRemoved {
        scene_id: scene.id(),
        widget_id: command.widget_id,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `AddCluster` command: creates a named clustering
/// configuration under the official plugin's cluster schema.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked and
/// `DomainError::Validation` if the name is blank.
#[instrument(skip_all, fields(scene_id = %command.scene_id))]
pub async fn handle_add_cluster(
    command: &AddCluster,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    let cluster = Cluster::new(ClusterId::new(), command.name.as_str(), PropertyId::new())?;
    let property = Property::new(
        cluster.property(),
        scene.id(),
        services.config.cluster_schema.clone(),
    );
    services.properties.save_property(&property).await?;
    let (cluster_id, name) = (cluster.id(), cluster.name().to_owned());
    scene.clusters_mut().add(cluster);
    save_scene(&mut scene, services).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, cluster_id = %cluster_id, "cluster added");
    let kind = SceneEventKind::ClusterAdded(ClusterAdded {
        scene_id: scene.id(),
        cluster_id,
        name,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `UpdateCluster` command: renames a clustering configuration.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked,
/// `DomainError::ClusterNotFound` if the scene has no such cluster, and
/// `DomainError::Validation` if the name is blank.
#[instrument(skip_all, fields(scene_id = %command.scene_id, cluster_id = %command.cluster_id))]
pub async fn handle_update_cluster(
    command: &UpdateCluster,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    scene
        .clusters_mut()
        .rename(command.cluster_id, command.name.as_str())?;
    save_scene(&mut scene, services).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, "cluster renamed");
    let kind = SceneEventKind::ClusterRenamed(ClusterRenamed {
        scene_id: scene.id(),
        cluster_id: command.cluster_id,
        name: command.name.clone(),
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Handles the `RemoveCluster` command: removes a clustering configuration
/// and deletes its configuration instance.
///
/// # Errors
///
/// Returns `DomainError::SceneLocked` if the scene is locked and
/// `DomainError::ClusterNotFound` if the scene has no such cluster.
#[instrument(skip_all, fields(scene_id = %command.scene_id, cluster_id = %command.cluster_id))]
pub async fn handle_remove_cluster(
    command: &RemoveCluster,
    operator: &Operator,
    services: &SceneServices,
) -> Result<SceneEvent, DomainError> {
    check_scene_lock(services.locks.as_ref(), command.scene_id).await?;
    let tx = services.transactions.begin().await?;
    let mut scene = load_writable_scene(command.scene_id, operator, services).await?;

    if !scene.clusters().has(command.cluster_id) {
        return Err(DomainError::ClusterNotFound(command.cluster_id));
    }
    let removed = scene.clusters_mut().remove(&[command.cluster_id]);
    save_scene(&mut scene, services).await?;
    services.properties.remove_properties(&removed).await?;
    tx.commit().await?;

    info!(correlation_id = %command.correlation_id, "cluster removed");
    let kind = SceneEventKind::ClusterRemoved(ClusterRemoved {
        scene_id: scene.id(),
        cluster_id: command.cluster_id,
    });
    Ok(event(scene.id(), command.correlation_id, kind, services))
}

/// Returns every scene lock to free. Used on process start to clear locks
/// left behind by a crashed instance.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lock store fails.
#[instrument(skip_all)]
pub async fn handle_release_all_locks(services: &SceneServices) -> Result<(), DomainError> {
    services.locks.release_all_locks().await?;
    info!("released all scene locks");
    Ok(())
}
