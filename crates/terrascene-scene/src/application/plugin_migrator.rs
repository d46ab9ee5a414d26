//! Applies a plugin upgrade to a scene and everything bound to it.
//!
//! [`migrate_plugin`] must run inside a storage transaction opened by the
//! caller: it writes to the scene, layer, property, and schema stores, and a
//! partially applied migration leaves layers pointing at extensions that no
//! longer exist.

use std::collections::HashSet;

use terrascene_core::error::DomainError;
use terrascene_core::id::{LayerId, PropertyId, SceneId};
use terrascene_core::plugin_id::{ExtensionId, PluginId};
use terrascene_layer::domain::layer::Layer;
use terrascene_plugin::domain::diff::ManifestDiff;
use terrascene_property::domain::property::Property;
use tracing::{debug, instrument};

use super::services::SceneServices;
use crate::domain::scene::Scene;

/// What a migration changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Scene-level configuration created for the new version.
    pub created_property: Option<PropertyId>,
    /// Layers deleted with their extension.
    pub removed_layers: Vec<LayerId>,
    /// Configuration instances deleted.
    pub removed_properties: Vec<PropertyId>,
    /// Configuration instances rewritten for the new schemas.
    pub migrated_properties: usize,
}

/// Upgrades `diff.from` to `diff.to` in `scene`.
///
/// The caller must have checked that `diff.from` is installed in the scene
/// and that `diff.to` is another version of the same plugin; bindings that do
/// not match are left alone.
///
/// # Errors
///
/// Returns `DomainError` if any store operation fails. The caller's
/// transaction must then be abandoned.
#[instrument(skip_all, fields(scene_id = %scene.id(), from = %diff.from, to = %diff.to))]
pub async fn migrate_plugin(
    scene: &mut Scene,
    diff: &ManifestDiff,
    services: &SceneServices,
) -> Result<MigrationOutcome, DomainError> {
    let scene_id = scene.id();
    let mut outcome = MigrationOutcome::default();
    let mut doomed = DeletionBatch::default();

    // Scene-level configuration for a schema the old version lacked.
    if let (Some(to_schema), None) = (&diff.to_schema, &diff.from_schema) {
        let property = Property::new(PropertyId::new(), scene_id, to_schema.clone());
        services.properties.save_property(&property).await?;
        outcome.created_property = Some(property.id());
    }

    if diff.schema_deleted {
        if let Some(old) = scene.plugins().config_of(&diff.from) {
            doomed.add(old);
        }
    }

    scene.widgets_mut().replace_plugin(&diff.from, &diff.to);
    scene.plugins_mut().upgrade_with_property(
        &diff.from,
        &diff.to,
        outcome.created_property,
        diff.schema_deleted,
    );

    for deleted in &diff.deleted_extensions {
        let extension = Some(&deleted.extension);
        let removed = remove_layers_bound_to(scene_id, &diff.from, extension, services).await?;
        doomed.extend(removed.properties);
        outcome.removed_layers.extend(removed.layers);

        doomed.extend(remove_blocks_bound_to(scene_id, &diff.from, extension, services).await?);

        // Widgets were already rebound to the new version above.
        doomed.extend(scene.remove_widgets_by_plugin_extension(&diff.to, &deleted.extension));
    }
    debug!(
        deleted_extensions = diff.deleted_extensions.len(),
        removed_layers = outcome.removed_layers.len(),
        "removed data of deleted extensions"
    );

    scene.touch(services.clock.as_ref());
    services.scenes.save_scene(scene).await?;

    services
        .layers
        .update_layer_plugin(scene_id, &diff.from, &diff.to)
        .await?;

    let mut changed = Vec::new();
    let candidates = services
        .properties
        .find_properties_by_schemas(scene_id, &diff.migrated_schemas())
        .await?;
    for mut property in candidates {
        if doomed.contains(property.id()) {
            continue;
        }
        let Some(schema_diff) = diff.schema_diff_for(property.schema()) else {
            continue;
        };
        if property.migrate(schema_diff) {
            changed.push(property);
        }
    }
    outcome.migrated_properties = changed.len();
    debug!(migrated = changed.len(), "migrated properties");

    services.properties.save_properties(&changed).await?;
    services
        .properties
        .update_schema_plugin(scene_id, &diff.from, &diff.to)
        .await?;

    outcome.removed_properties = doomed.into_ids();
    services
        .properties
        .remove_properties(&outcome.removed_properties)
        .await?;
    services
        .schemas
        .remove_schemas(&diff.deleted_schemas())
        .await?;
    debug!(
        removed_properties = outcome.removed_properties.len(),
        "removed orphaned properties"
    );

    Ok(outcome)
}

/// Layers and configuration references removed with one extension.
#[derive(Debug, Default)]
pub(crate) struct RemovedLayers {
    pub(crate) layers: Vec<LayerId>,
    pub(crate) properties: Vec<PropertyId>,
}

/// Deletes every layer of `scene` rendered by `plugin`'s `extension` (every
/// extension when `None`), detaching them from their parent groups.
pub(crate) async fn remove_layers_bound_to(
    scene: SceneId,
    plugin: &PluginId,
    extension: Option<&ExtensionId>,
    services: &SceneServices,
) -> Result<RemovedLayers, DomainError> {
    let layers = services
        .layers
        .find_layers_by_plugin_and_extension(scene, plugin, extension)
        .await?;
    if layers.is_empty() {
        return Ok(RemovedLayers::default());
    }

    let ids: Vec<LayerId> = layers.iter().map(Layer::id).collect();
    let properties = layers.iter().flat_map(Layer::properties).collect();

    let parents: Vec<Layer> = services
        .layers
        .find_parent_layers(scene, &ids)
        .await?
        .into_iter()
        .filter(|parent| !ids.contains(&parent.base.id))
        .filter_map(|mut parent| parent.remove_children(&ids).then_some(Layer::Group(parent)))
        .collect();
    services.layers.save_layers(&parents).await?;
    services.layers.remove_layers(&ids).await?;

    Ok(RemovedLayers {
        layers: ids,
        properties,
    })
}

/// Deletes every info-box block of `scene` provided by `plugin`'s
/// `extension` (every extension when `None`) and returns the configuration
/// references they owned.
pub(crate) async fn remove_blocks_bound_to(
    scene: SceneId,
    plugin: &PluginId,
    extension: Option<&ExtensionId>,
    services: &SceneServices,
) -> Result<Vec<PropertyId>, DomainError> {
    let mut layers = services
        .layers
        .find_layers_by_plugin_and_extension_of_blocks(scene, plugin, extension)
        .await?;
    let mut removed = Vec::new();
    for layer in &mut layers {
        if let Some(infobox) = layer.base_mut().infobox.as_mut() {
            removed.extend(infobox.remove_fields_bound_to(plugin, extension));
        }
    }
    services.layers.save_layers(&layers).await?;
    Ok(removed)
}

/// Configuration references queued for deletion, deduplicated in order.
#[derive(Debug, Default)]
pub(crate) struct DeletionBatch {
    ids: Vec<PropertyId>,
    seen: HashSet<PropertyId>,
}

impl DeletionBatch {
    pub(crate) fn add(&mut self, id: PropertyId) {
        if self.seen.insert(id) {
            self.ids.push(id);
        }
    }

    pub(crate) fn extend(&mut self, ids: impl IntoIterator<Item = PropertyId>) {
        for id in ids {
            self.add(id);
        }
    }

    pub(crate) fn contains(&self, id: PropertyId) -> bool {
        self.seen.contains(&id)
    }

    pub(crate) fn into_ids(self) -> Vec<PropertyId> {
        self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_batch_keeps_first_occurrence_order() {
        let a = PropertyId::new();
        let b = PropertyId::new();
        let mut batch = DeletionBatch::default();

        batch.add(a);
        batch.extend([b, a, b]);

        assert!(batch.contains(a));
        assert_eq!(batch.into_ids(), vec![a, b]);
    }
}
