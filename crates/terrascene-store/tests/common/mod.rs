//! Shared fixtures for the scene use-case integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use terrascene_core::config::EngineConfig;
use terrascene_core::error::DomainError;
use terrascene_core::id::{
    InfoboxFieldId, LayerId, ProjectId, PropertyId, SceneId, WidgetId, WorkspaceId,
};
use terrascene_core::operator::Operator;
use terrascene_core::plugin_id::{ExtensionId, PluginId, PropertySchemaId};
use terrascene_layer::domain::infobox::{Infobox, InfoboxField};
use terrascene_layer::domain::layer::{Layer, LayerBase, LayerGroup, LayerItem};
use terrascene_layer::repository::LayerRepository;
use terrascene_plugin::domain::manifest::Manifest;
use terrascene_plugin::repository::PluginRepository;
use terrascene_property::domain::property::Property;
use terrascene_property::repository::{PropertyRepository, PropertySchemaRepository};
use terrascene_scene::application::command_handlers::{
    handle_add_widget, handle_install_plugin,
};
use terrascene_scene::application::services::SceneServices;
use terrascene_scene::domain::commands::{AddWidget, InstallPlugin};
use terrascene_scene::domain::events::{SceneEvent, SceneEventKind};
use terrascene_scene::domain::scene::{Scene, SceneBuilder};
use terrascene_scene::domain::widget_align::WidgetLocation;
use terrascene_scene::repository::SceneRepository;
use terrascene_store::memory::MemoryStore;
use terrascene_test_support::{FixedClock, init_tracing, plugin_id, writer_of};
use uuid::Uuid;

/// First version of the test plugin.
pub const CHARTS_V1: &str = r"
id: charts
version: 1.0.0
schema:
  groups:
    - id: default
      fields:
        - id: apiKey
          type: string
extensions:
  - id: menu
    type: widget
    schema:
      groups:
        - id: default
          fields:
            - id: title
              type: string
            - id: legacy
              type: string
  - id: legend
    type: widget
  - id: table
    type: block
  - id: marker
    type: primitive
  - id: heatmap
    type: primitive
";

/// Second version: `legend`, `table`, and `heatmap` are gone and `menu`
/// lost its `legacy` field.
pub const CHARTS_V2: &str = r"
id: charts
version: 1.0.1
schema:
  groups:
    - id: default
      fields:
        - id: apiKey
          type: string
extensions:
  - id: menu
    type: widget
    schema:
      groups:
        - id: default
          fields:
            - id: title
              type: string
  - id: marker
    type: primitive
";

/// Fixed timestamp used across all integration tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A stored scene wired to a fresh [`MemoryStore`].
pub struct TestScene {
    pub store: MemoryStore,
    pub services: SceneServices,
    pub scene_id: SceneId,
    pub workspace: WorkspaceId,
    pub root_layer: LayerId,
    pub operator: Operator,
}

impl TestScene {
    /// Creates a scene holding only the official plugin, and stores every
    /// manifest in `manifests` as a public plugin.
    pub async fn new(manifests: &[&str]) -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let services = store.services(Arc::new(FixedClock(fixed_now())), EngineConfig::default());

        let scene_id = SceneId::new();
        let workspace = WorkspaceId::new();
        let root_layer = LayerId::new();
        let scene = SceneBuilder::new(&services.config)
            .id(scene_id)
            .workspace(workspace)
            .project(ProjectId::new())
            .root_layer(root_layer)
            .property(PropertyId::new())
            .build(services.clock.as_ref())
            .unwrap();
        store.save_scene(&scene).await.unwrap();
        store
            .save_layer(&Layer::Group(LayerGroup::root(root_layer, scene_id)))
            .await
            .unwrap();

        let fixture = Self {
            store,
            services,
            scene_id,
            workspace,
            root_layer,
            operator: writer_of(workspace),
        };
        for source in manifests {
            fixture.save_manifest(source, None).await;
        }
        fixture
    }

    /// Stores a manifest and its schemas.
    pub async fn save_manifest(&self, source: &str, scene: Option<SceneId>) -> Manifest {
        let manifest = Manifest::from_yaml(source, scene).unwrap();
        self.store.save_plugin(&manifest).await.unwrap();
        let schemas: Vec<_> = manifest.schemas().into_iter().cloned().collect();
        self.store.save_schemas(&schemas).await.unwrap();
        manifest
    }

    /// Loads the scene.
    pub async fn scene(&self) -> Scene {
        self.store.find_scene(self.scene_id).await.unwrap().unwrap()
    }

    /// Loads the root layer group.
    pub async fn root(&self) -> LayerGroup {
        let root = self.store.find_layer(self.root_layer).await.unwrap().unwrap();
        root.as_group().unwrap().clone()
    }

    /// Returns `true` if the property is stored.
    pub async fn has_property(&self, id: PropertyId) -> bool {
        self.store.find_property(id).await.unwrap().is_some()
    }

    pub async fn install(&self, plugin: &str) -> Result<SceneEvent, DomainError> {
        let command = InstallPlugin {
            correlation_id: Uuid::new_v4(),
            scene_id: self.scene_id,
            plugin_id: plugin_id(plugin),
        };
        handle_install_plugin(&command, &self.operator, &self.services).await
    }

    pub async fn add_widget(
        &self,
        plugin: &str,
        extension: &str,
        location: Option<WidgetLocation>,
    ) -> Result<SceneEvent, DomainError> {
        let command = AddWidget {
            correlation_id: Uuid::new_v4(),
            scene_id: self.scene_id,
            plugin_id: plugin_id(plugin),
            extension_id: ExtensionId::new(extension).unwrap(),
            location,
        };
        handle_add_widget(&command, &self.operator, &self.services).await
    }

    /// Adds a widget and returns its id and configuration.
    pub async fn place_widget(&self, plugin: &str, extension: &str) -> (WidgetId, PropertyId) {
        let event = self.add_widget(plugin, extension, None).await.unwrap();
        let SceneEventKind::WidgetAdded(added) = event.kind else {
            panic!("expected a WidgetAdded event");
        };
        let scene = self.scene().await;
        let widget = scene.widgets().widget(added.widget_id).unwrap();
        (added.widget_id, widget.property())
    }

    /// Stores a layer rendered by `plugin`'s `extension` under the root
    /// group, with its own configuration.
    pub async fn add_layer(&self, plugin: &str, extension: &str) -> (LayerId, PropertyId) {
        let plugin = plugin_id(plugin);
        let schema = PropertySchemaId::new(plugin.clone(), extension).unwrap();
        let property = Property::new(PropertyId::new(), self.scene_id, schema);
        self.store.save_property(&property).await.unwrap();

        let id = LayerId::new();
        let base = LayerBase::new(id, self.scene_id, extension).bound_to(
            plugin,
            ExtensionId::new(extension).unwrap(),
            property.id(),
        );
        self.store
            .save_layer(&Layer::Item(LayerItem { base }))
            .await
            .unwrap();

        let mut root = self.root().await;
        root.add_child(id);
        self.store.save_layer(&Layer::Group(root)).await.unwrap();
        (id, property.id())
    }

    /// Puts a block of `plugin`'s `extension` into the info-box of `layer`
    /// and returns the block's configuration.
    pub async fn add_block(&self, layer: LayerId, plugin: &str, extension: &str) -> PropertyId {
        let plugin = plugin_id(plugin);
        let schema = PropertySchemaId::new(plugin.clone(), extension).unwrap();
        let property = Property::new(PropertyId::new(), self.scene_id, schema);
        self.store.save_property(&property).await.unwrap();

        let mut stored = self.store.find_layer(layer).await.unwrap().unwrap();
        let base = stored.base_mut();
        let infobox = base.infobox.get_or_insert_with(|| Infobox::new(PropertyId::new()));
        infobox.fields.push(InfoboxField {
            id: InfoboxFieldId::new(),
            plugin,
            extension: ExtensionId::new(extension).unwrap(),
            property: property.id(),
        });
        self.store.save_layer(&stored).await.unwrap();
        property.id()
    }
}

/// Parses a plugin id of the test plugin.
pub fn charts(version: &str) -> PluginId {
    plugin_id(&format!("charts~{version}"))
}
