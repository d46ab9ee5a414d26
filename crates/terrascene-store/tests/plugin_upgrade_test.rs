//! Integration tests for upgrading an installed plugin to another version.

mod common;

use common::{CHARTS_V1, CHARTS_V2, TestScene, charts};
use pretty_assertions::assert_eq;
use terrascene_core::error::DomainError;
use terrascene_core::plugin_id::{ExtensionId, PluginId, PropertySchemaId};
use terrascene_layer::repository::LayerRepository;
use terrascene_property::domain::value::Value;
use terrascene_property::repository::{PropertyRepository, PropertySchemaRepository};
use terrascene_scene::application::command_handlers::handle_upgrade_plugin;
use terrascene_scene::domain::commands::UpgradePlugin;
use terrascene_scene::domain::events::{SceneEvent, SceneEventKind};
use terrascene_scene::domain::lock::LockMode;
use terrascene_scene::repository::SceneLockRepository;
use terrascene_test_support::plugin_id;
use uuid::Uuid;

async fn upgrade(t: &TestScene, from: PluginId, to: PluginId) -> Result<SceneEvent, DomainError> {
    let command = UpgradePlugin {
        correlation_id: Uuid::new_v4(),
        scene_id: t.scene_id,
        plugin_id: from,
        to_plugin_id: to,
    };
    handle_upgrade_plugin(&command, &t.operator, &t.services).await
}

fn schema(raw: &str) -> PropertySchemaId {
    raw.parse().unwrap()
}

/// A plugin without scene-level configuration.
const MAPS_PLAIN: &str = r"
id: maps
version: 1.0.0
extensions:
  - id: compass
    type: widget
";

/// The next version adds scene-level configuration.
const MAPS_CONFIGURED: &str = r"
id: maps
version: 1.1.0
schema:
  groups:
    - id: default
      fields:
        - id: style
          type: string
extensions:
  - id: compass
    type: widget
";

/// The version after that drops it again.
const MAPS_UNCONFIGURED: &str = r"
id: maps
version: 1.2.0
extensions:
  - id: compass
    type: widget
";

#[tokio::test]
async fn test_upgrade_migrates_every_piece_of_scene_data() {
    // Arrange
    let t = TestScene::new(&[CHARTS_V1, CHARTS_V2]).await;
    t.install("charts~1.0.0").await.unwrap();
    let config = t.scene().await.plugins().config_of(&charts("1.0.0")).unwrap();

    let (menu, menu_property) = t.place_widget("charts~1.0.0", "menu").await;
    let mut property = t.store.find_property(menu_property).await.unwrap().unwrap();
    property
        .set_value("default", "title", Value::String("Sales".into()))
        .unwrap();
    property
        .set_value("default", "legacy", Value::String("old".into()))
        .unwrap();
    t.store.save_property(&property).await.unwrap();

    let (legend, legend_property) = t.place_widget("charts~1.0.0", "legend").await;
    let (marker, _) = t.add_layer("charts~1.0.0", "marker").await;
    let (heatmap, heatmap_property) = t.add_layer("charts~1.0.0", "heatmap").await;
    let block_property = t.add_block(marker, "charts~1.0.0", "table").await;

    // Act
    let event = upgrade(&t, charts("1.0.0"), charts("1.0.1")).await.unwrap();

    // Assert
    let SceneEventKind::PluginUpgraded(upgraded) = event.kind else {
        panic!("expected a PluginUpgraded event");
    };
    let deleted: Vec<&str> = upgraded
        .deleted_extensions
        .iter()
        .map(ExtensionId::as_str)
        .collect();
    assert_eq!(deleted, vec!["legend", "table", "heatmap"]);

    let scene = t.scene().await;
    assert!(!scene.plugins().has(&charts("1.0.0")));
    assert_eq!(scene.plugins().config_of(&charts("1.0.1")), Some(config));

    // Widgets of kept extensions are rebound; the rest are gone.
    assert_eq!(scene.widgets().widget(menu).unwrap().plugin(), &charts("1.0.1"));
    assert!(scene.widgets().widget(legend).is_none());
    assert_eq!(scene.widget_align().widget_ids(), vec![menu]);

    // Layers of kept extensions are rebound; the rest are removed and detached.
    let marker_layer = t.store.find_layer(marker).await.unwrap().unwrap();
    assert_eq!(marker_layer.base().plugin, Some(charts("1.0.1")));
    assert!(marker_layer.base().infobox.as_ref().unwrap().fields.is_empty());
    assert_eq!(t.store.find_layer(heatmap).await.unwrap(), None);
    assert_eq!(t.root().await.children(), &[marker]);

    for id in [legend_property, heatmap_property, block_property] {
        assert!(!t.has_property(id).await, "property {id} should be gone");
    }

    // Surviving configuration follows the new schemas.
    let menu_config = t.store.find_property(menu_property).await.unwrap().unwrap();
    assert_eq!(menu_config.schema(), &schema("charts~1.0.1/menu"));
    assert_eq!(
        menu_config.value("default", "title"),
        Some(&Value::String("Sales".into()))
    );
    assert_eq!(menu_config.value("default", "legacy"), None);
    let plugin_config = t.store.find_property(config).await.unwrap().unwrap();
    assert_eq!(plugin_config.schema(), &schema("charts~1.0.1/__plugin"));

    // Schemas of deleted extensions are gone; kept ones stay.
    let old = t
        .store
        .find_schemas(&[
            schema("charts~1.0.0/legend"),
            schema("charts~1.0.0/table"),
            schema("charts~1.0.0/heatmap"),
            schema("charts~1.0.0/menu"),
        ])
        .await
        .unwrap();
    let remaining: Vec<String> = old.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(remaining, vec!["charts~1.0.0/menu"]);

    assert_eq!(t.store.get_lock(t.scene_id).await.unwrap(), LockMode::Free);
}

#[tokio::test]
async fn test_upgrade_creates_configuration_for_new_plugin_schema() {
    // Arrange
    let t = TestScene::new(&[MAPS_PLAIN, MAPS_CONFIGURED]).await;
    t.install("maps~1.0.0").await.unwrap();
    assert_eq!(t.scene().await.plugins().config_of(&plugin_id("maps~1.0.0")), None);

    // Act
    upgrade(&t, plugin_id("maps~1.0.0"), plugin_id("maps~1.1.0"))
        .await
        .unwrap();

    // Assert
    let scene = t.scene().await;
    assert!(!scene.plugins().has(&plugin_id("maps~1.0.0")));
    let config = scene
        .plugins()
        .config_of(&plugin_id("maps~1.1.0"))
        .expect("the upgraded plugin should own a configuration");
    let property = t.store.find_property(config).await.unwrap().unwrap();
    assert_eq!(property.schema(), &schema("maps~1.1.0/__plugin"));
    assert_eq!(property.scene(), t.scene_id);
}

#[tokio::test]
async fn test_upgrade_deletes_configuration_of_dropped_plugin_schema() {
    // Arrange
    let t = TestScene::new(&[MAPS_CONFIGURED, MAPS_UNCONFIGURED]).await;
    t.install("maps~1.1.0").await.unwrap();
    let old_config = t
        .scene()
        .await
        .plugins()
        .config_of(&plugin_id("maps~1.1.0"))
        .unwrap();

    // Act
    upgrade(&t, plugin_id("maps~1.1.0"), plugin_id("maps~1.2.0"))
        .await
        .unwrap();

    // Assert
    let scene = t.scene().await;
    assert!(scene.plugins().has(&plugin_id("maps~1.2.0")));
    assert_eq!(scene.plugins().config_of(&plugin_id("maps~1.2.0")), None);
    assert!(!t.has_property(old_config).await);
    let left = t
        .store
        .find_schemas(&[schema("maps~1.1.0/__plugin")])
        .await
        .unwrap();
    assert!(left.is_empty());
}

#[tokio::test]
async fn test_upgrade_rolls_back_when_a_store_fails() {
    // Arrange
    let t = TestScene::new(&[CHARTS_V1, CHARTS_V2]).await;
    t.install("charts~1.0.0").await.unwrap();
    let (_, legend_property) = t.place_widget("charts~1.0.0", "legend").await;
    let (heatmap, _) = t.add_layer("charts~1.0.0", "heatmap").await;
    let before = t.scene().await;
    t.store.fail_on("remove_schemas");

    // Act
    let result = upgrade(&t, charts("1.0.0"), charts("1.0.1")).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    assert_eq!(t.scene().await, before);
    assert!(t.store.find_layer(heatmap).await.unwrap().is_some());
    assert_eq!(t.root().await.children(), &[heatmap]);
    assert!(t.has_property(legend_property).await);
    assert_eq!(t.store.get_lock(t.scene_id).await.unwrap(), LockMode::Free);
}

#[tokio::test]
async fn test_upgrade_is_rejected_while_scene_is_locked() {
    // Arrange
    let t = TestScene::new(&[CHARTS_V1, CHARTS_V2]).await;
    t.install("charts~1.0.0").await.unwrap();
    t.store
        .update_lock(t.scene_id, LockMode::Free, LockMode::Publishing)
        .await
        .unwrap();

    // Act
    let result = upgrade(&t, charts("1.0.0"), charts("1.0.1")).await;

    // Assert
    assert!(matches!(result, Err(DomainError::SceneLocked(_))));
    assert!(t.scene().await.plugins().has(&charts("1.0.0")));
    assert_eq!(
        t.store.get_lock(t.scene_id).await.unwrap(),
        LockMode::Publishing
    );
}

#[tokio::test]
async fn test_upgrade_to_another_plugin_is_invalid() {
    let t = TestScene::new(&[CHARTS_V1]).await;
    t.install("charts~1.0.0").await.unwrap();

    let result = upgrade(&t, charts("1.0.0"), plugin_id("maps~1.0.0")).await;

    assert!(matches!(
        result,
        Err(DomainError::InvalidPluginUpgrade { .. })
    ));
}

#[tokio::test]
async fn test_upgrade_to_the_same_version_is_invalid() {
    let t = TestScene::new(&[CHARTS_V1]).await;
    t.install("charts~1.0.0").await.unwrap();

    let result = upgrade(&t, charts("1.0.0"), charts("1.0.0")).await;

    assert!(matches!(
        result,
        Err(DomainError::InvalidPluginUpgrade { .. })
    ));
}

#[tokio::test]
async fn test_upgrade_of_official_plugin_is_invalid() {
    let t = TestScene::new(&[]).await;

    let result = upgrade(&t, PluginId::official(), plugin_id("official~1.0.0")).await;

    assert!(matches!(
        result,
        Err(DomainError::InvalidPluginUpgrade { .. })
    ));
    assert_eq!(t.store.get_lock(t.scene_id).await.unwrap(), LockMode::Free);
}

#[tokio::test]
async fn test_upgrade_of_plugin_that_is_not_installed_is_rejected() {
    let t = TestScene::new(&[CHARTS_V1, CHARTS_V2]).await;

    let result = upgrade(&t, charts("1.0.0"), charts("1.0.1")).await;

    assert!(matches!(result, Err(DomainError::PluginNotInstalled(_))));
}

#[tokio::test]
async fn test_upgrade_to_missing_version_is_not_found() {
    let t = TestScene::new(&[CHARTS_V1]).await;
    t.install("charts~1.0.0").await.unwrap();

    let result = upgrade(&t, charts("1.0.0"), charts("2.0.0")).await;

    assert!(matches!(result, Err(DomainError::PluginNotFound(_))));
    assert!(t.scene().await.plugins().has(&charts("1.0.0")));
}
