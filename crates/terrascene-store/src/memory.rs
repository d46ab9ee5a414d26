//! In-memory implementation of every repository.
//!
//! [`MemoryStore`] keeps scenes, plugins, properties, schemas, and layers in
//! one table set. A [`MemoryTransaction`] snapshots that set when it begins
//! and puts the snapshot back if it is dropped uncommitted. Transactions are
//! serialized: a second `begin` waits until the first commits or aborts.
//!
//! Scene locks live outside the table set and are never rolled back, the
//! same as a lock table written outside the data transaction.
//!
//! Tests can make the next call to a named repository method fail with
//! [`MemoryStore::fail_on`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use terrascene_core::clock::Clock;
use terrascene_core::config::EngineConfig;
use terrascene_core::error::DomainError;
use terrascene_core::id::{LayerId, PropertyId, SceneId};
use terrascene_core::plugin_id::{ExtensionId, PluginId, PropertySchemaId};
use terrascene_core::transaction::{Transaction, TransactionManager};
use terrascene_layer::domain::layer::{Layer, LayerGroup};
use terrascene_layer::repository::LayerRepository;
use terrascene_plugin::domain::manifest::Manifest;
use terrascene_plugin::repository::PluginRepository;
use terrascene_property::domain::property::Property;
use terrascene_property::domain::schema::PropertySchema;
use terrascene_property::repository::{PropertyRepository, PropertySchemaRepository};
use terrascene_scene::application::services::SceneServices;
use terrascene_scene::domain::lock::LockMode;
use terrascene_scene::domain::scene::Scene;
use terrascene_scene::repository::{SceneLockRepository, SceneRepository};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
struct Tables {
    scenes: BTreeMap<SceneId, Scene>,
    plugins: BTreeMap<PluginId, Manifest>,
    properties: BTreeMap<PropertyId, Property>,
    schemas: BTreeMap<PropertySchemaId, PropertySchema>,
    layers: BTreeMap<LayerId, Layer>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Mutex<Tables>,
    locks: Mutex<HashMap<SceneId, LockMode>>,
    failures: Mutex<Vec<&'static str>>,
    gate: Arc<tokio::sync::Mutex<()>>,
}

/// Every repository of the engine, held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires this store into every repository slot of [`SceneServices`].
    #[must_use]
    pub fn services(&self, clock: Arc<dyn Clock>, config: EngineConfig) -> SceneServices {
        let store = Arc::new(self.clone());
        SceneServices {
            scenes: store.clone(),
            locks: store.clone(),
            plugins: store.clone(),
            properties: store.clone(),
            schemas: store.clone(),
            layers: store.clone(),
            transactions: store,
            clock,
            config,
        }
    }

    /// Makes the next call to the repository method named `operation` fail
    /// with `DomainError::Infrastructure`.
    pub fn fail_on(&self, operation: &'static str) {
        lock(&self.inner.failures).push(operation);
    }

    fn check(&self, operation: &'static str) -> Result<(), DomainError> {
        let mut failures = lock(&self.inner.failures);
        if let Some(pos) = failures.iter().position(|f| *f == operation) {
            failures.remove(pos);
            warn!(operation, "injected store failure");
            return Err(DomainError::Infrastructure(format!(
                "injected failure in {operation}"
            )));
        }
        Ok(())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        lock(&self.inner.tables)
    }

    fn lock_of(&self, scene: SceneId) -> LockMode {
        lock(&self.inner.locks)
            .get(&scene)
            .copied()
            .unwrap_or_default()
    }
}

/// A snapshot transaction over a [`MemoryStore`].
pub struct MemoryTransaction {
    inner: Arc<Inner>,
    snapshot: Option<Tables>,
    _gate: OwnedMutexGuard<()>,
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("open", &self.snapshot.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(mut self: Box<Self>) -> Result<(), DomainError> {
        self.snapshot = None;
        debug!("memory transaction committed");
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *lock(&self.inner.tables) = snapshot;
            debug!("memory transaction rolled back");
        }
    }
}

#[async_trait]
impl TransactionManager for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DomainError> {
        self.check("begin")?;
        let gate = Arc::clone(&self.inner.gate).lock_owned().await;
        let snapshot = self.tables().clone();
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            snapshot: Some(snapshot),
            _gate: gate,
        }))
    }
}

#[async_trait]
impl SceneRepository for MemoryStore {
    async fn find_scene(&self, id: SceneId) -> Result<Option<Scene>, DomainError> {
        self.check("find_scene")?;
        Ok(self.tables().scenes.get(&id).cloned())
    }

    async fn save_scene(&self, scene: &Scene) -> Result<(), DomainError> {
        self.check("save_scene")?;
        self.tables().scenes.insert(scene.id(), scene.clone());
        Ok(())
    }
}

#[async_trait]
impl SceneLockRepository for MemoryStore {
    async fn get_lock(&self, scene: SceneId) -> Result<LockMode, DomainError> {
        self.check("get_lock")?;
        Ok(self.lock_of(scene))
    }

    async fn get_locks(&self, scenes: &[SceneId]) -> Result<Vec<LockMode>, DomainError> {
        self.check("get_locks")?;
        Ok(scenes.iter().map(|s| self.lock_of(*s)).collect())
    }

    async fn update_lock(
        &self,
        scene: SceneId,
        before: LockMode,
        after: LockMode,
    ) -> Result<(), DomainError> {
        self.check("update_lock")?;
        let mut locks = lock(&self.inner.locks);
        let current = locks.get(&scene).copied().unwrap_or_default();
        if current != before {
            return Err(DomainError::SceneLocked(scene));
        }
        if after == LockMode::Free {
            locks.remove(&scene);
        } else {
            locks.insert(scene, after);
        }
        Ok(())
    }

    async fn release_lock(&self, scene: SceneId) -> Result<(), DomainError> {
        self.check("release_lock")?;
        lock(&self.inner.locks).remove(&scene);
        Ok(())
    }

    async fn release_all_locks(&self) -> Result<(), DomainError> {
        self.check("release_all_locks")?;
        lock(&self.inner.locks).clear();
        Ok(())
    }
}

#[async_trait]
impl PluginRepository for MemoryStore {
    async fn find_plugin(
        &self,
        id: &PluginId,
        scene: Option<SceneId>,
    ) -> Result<Option<Manifest>, DomainError> {
        self.check("find_plugin")?;
        let visible = match scene {
            Some(scene) => id.visible_from(scene),
            None => id.scene().is_none(),
        };
        if !visible {
            return Ok(None);
        }
        Ok(self.tables().plugins.get(id).cloned())
    }

    async fn find_plugins(&self, ids: &[PluginId]) -> Result<Vec<Manifest>, DomainError> {
        self.check("find_plugins")?;
        let tables = self.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.plugins.get(id).cloned())
            .collect())
    }

    async fn save_plugin(&self, manifest: &Manifest) -> Result<(), DomainError> {
        self.check("save_plugin")?;
        self.tables()
            .plugins
            .insert(manifest.id.clone(), manifest.clone());
        Ok(())
    }

    async fn remove_plugin(&self, id: &PluginId) -> Result<(), DomainError> {
        self.check("remove_plugin")?;
        self.tables().plugins.remove(id);
        Ok(())
    }
}

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, DomainError> {
        self.check("find_property")?;
        Ok(self.tables().properties.get(&id).cloned())
    }

    async fn find_properties(&self, ids: &[PropertyId]) -> Result<Vec<Property>, DomainError> {
        self.check("find_properties")?;
        let tables = self.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.properties.get(id).cloned())
            .collect())
    }

    async fn find_properties_by_schemas(
        &self,
        scene: SceneId,
        schemas: &[PropertySchemaId],
    ) -> Result<Vec<Property>, DomainError> {
        self.check("find_properties_by_schemas")?;
        Ok(self
            .tables()
            .properties
            .values()
            .filter(|p| p.scene() == scene && schemas.contains(p.schema()))
            .cloned()
            .collect())
    }

    async fn save_property(&self, property: &Property) -> Result<(), DomainError> {
        self.check("save_property")?;
        self.tables()
            .properties
            .insert(property.id(), property.clone());
        Ok(())
    }

    async fn save_properties(&self, properties: &[Property]) -> Result<(), DomainError> {
        self.check("save_properties")?;
        let mut tables = self.tables();
        for property in properties {
            tables.properties.insert(property.id(), property.clone());
        }
        Ok(())
    }

    async fn remove_property(&self, id: PropertyId) -> Result<(), DomainError> {
        self.check("remove_property")?;
        self.tables().properties.remove(&id);
        Ok(())
    }

    async fn remove_properties(&self, ids: &[PropertyId]) -> Result<(), DomainError> {
        self.check("remove_properties")?;
        let mut tables = self.tables();
        for id in ids {
            tables.properties.remove(id);
        }
        Ok(())
    }

    async fn update_schema_plugin(
        &self,
        scene: SceneId,
        old: &PluginId,
        new: &PluginId,
    ) -> Result<(), DomainError> {
        self.check("update_schema_plugin")?;
        let mut tables = self.tables();
        for property in tables
            .properties
            .values_mut()
            .filter(|p| p.scene() == scene && p.schema().plugin() == old)
        {
            let schema = property.schema().with_plugin(new.clone());
            property.set_schema(schema);
        }
        Ok(())
    }
}

#[async_trait]
impl PropertySchemaRepository for MemoryStore {
    async fn find_schemas(
        &self,
        ids: &[PropertySchemaId],
    ) -> Result<Vec<PropertySchema>, DomainError> {
        self.check("find_schemas")?;
        let tables = self.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.schemas.get(id).cloned())
            .collect())
    }

    async fn save_schemas(&self, schemas: &[PropertySchema]) -> Result<(), DomainError> {
        self.check("save_schemas")?;
        let mut tables = self.tables();
        for schema in schemas {
            tables.schemas.insert(schema.id.clone(), schema.clone());
        }
        Ok(())
    }

    async fn remove_schemas(&self, ids: &[PropertySchemaId]) -> Result<(), DomainError> {
        self.check("remove_schemas")?;
        let mut tables = self.tables();
        for id in ids {
            tables.schemas.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl LayerRepository for MemoryStore {
    async fn find_layer(&self, id: LayerId) -> Result<Option<Layer>, DomainError> {
        self.check("find_layer")?;
        Ok(self.tables().layers.get(&id).cloned())
    }

    async fn find_layers_by_plugin_and_extension(
        &self,
        scene: SceneId,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Result<Vec<Layer>, DomainError> {
        self.check("find_layers_by_plugin_and_extension")?;
        Ok(self
            .tables()
            .layers
            .values()
            .filter(|l| l.scene() == scene && l.is_bound_to(plugin, extension))
            .cloned()
            .collect())
    }

    async fn find_layers_by_plugin_and_extension_of_blocks(
        &self,
        scene: SceneId,
        plugin: &PluginId,
        extension: Option<&ExtensionId>,
    ) -> Result<Vec<Layer>, DomainError> {
        self.check("find_layers_by_plugin_and_extension_of_blocks")?;
        Ok(self
            .tables()
            .layers
            .values()
            .filter(|l| l.scene() == scene && l.has_blocks_bound_to(plugin, extension))
            .cloned()
            .collect())
    }

    async fn find_parent_layers(
        &self,
        scene: SceneId,
        ids: &[LayerId],
    ) -> Result<Vec<LayerGroup>, DomainError> {
        self.check("find_parent_layers")?;
        Ok(self
            .tables()
            .layers
            .values()
            .filter(|l| l.scene() == scene)
            .filter_map(Layer::as_group)
            .filter(|g| ids.iter().any(|id| g.has_child(*id)))
            .cloned()
            .collect())
    }

    async fn save_layer(&self, layer: &Layer) -> Result<(), DomainError> {
        self.check("save_layer")?;
        self.tables().layers.insert(layer.id(), layer.clone());
        Ok(())
    }

    async fn save_layers(&self, layers: &[Layer]) -> Result<(), DomainError> {
        self.check("save_layers")?;
        let mut tables = self.tables();
        for layer in layers {
            tables.layers.insert(layer.id(), layer.clone());
        }
        Ok(())
    }

    async fn remove_layers(&self, ids: &[LayerId]) -> Result<(), DomainError> {
        self.check("remove_layers")?;
        let mut tables = self.tables();
        for id in ids {
            tables.layers.remove(id);
        }
        Ok(())
    }

    async fn update_layer_plugin(
        &self,
        scene: SceneId,
        old: &PluginId,
        new: &PluginId,
    ) -> Result<(), DomainError> {
        self.check("update_layer_plugin")?;
        let mut tables = self.tables();
        for layer in tables.layers.values_mut().filter(|l| l.scene() == scene) {
            layer.replace_plugin(old, new);
        }
        Ok(())
    }
}
