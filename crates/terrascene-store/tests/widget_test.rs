//! Integration tests for widget placement and layout.

mod common;

use common::{CHARTS_V1, TestScene, charts};
use pretty_assertions::assert_eq;
use terrascene_core::error::DomainError;
use terrascene_core::id::WidgetId;
use terrascene_property::repository::PropertyRepository;
use terrascene_scene::application::command_handlers::{
    handle_remove_widget, handle_update_widget, handle_update_widget_area,
};
use terrascene_scene::domain::commands::{RemoveWidget, UpdateWidget, UpdateWidgetArea};
use terrascene_scene::domain::events::SceneEventKind;
use terrascene_scene::domain::lock::LockMode;
use terrascene_scene::domain::widget_align::{
    AreaType, SectionType, WidgetAlign, WidgetLocation, ZoneType,
};
use terrascene_scene::repository::SceneLockRepository;
use uuid::Uuid;

fn update(t: &TestScene, widget_id: WidgetId) -> UpdateWidget {
    UpdateWidget {
        correlation_id: Uuid::new_v4(),
        scene_id: t.scene_id,
        widget_id,
        enabled: None,
        extended: None,
        location: None,
        index: None,
    }
}

fn outer_right_bottom() -> WidgetLocation {
    WidgetLocation::new(ZoneType::Outer, SectionType::Right, AreaType::Bottom)
}

async fn installed() -> TestScene {
    let t = TestScene::new(&[CHARTS_V1]).await;
    t.install("charts~1.0.0").await.unwrap();
    t
}

// --- add ---

#[tokio::test]
async fn test_add_widget_places_it_at_the_default_location() {
    // Arrange
    let t = installed().await;

    // Act
    let event = t.add_widget("charts~1.0.0", "menu", None).await.unwrap();

    // Assert
    let SceneEventKind::WidgetAdded(added) = event.kind else {
        panic!("expected a WidgetAdded event");
    };
    assert_eq!(added.location, WidgetLocation::default());

    let scene = t.scene().await;
    let widget = scene.widgets().widget(added.widget_id).unwrap();
    assert_eq!(widget.plugin(), &charts("1.0.0"));
    assert!(widget.enabled());
    assert_eq!(
        scene.widget_align().find(added.widget_id),
        Some((0, WidgetLocation::default()))
    );

    let property = t.store.find_property(widget.property()).await.unwrap().unwrap();
    assert_eq!(property.schema().to_string(), "charts~1.0.0/menu");
}

#[tokio::test]
async fn test_add_widget_at_a_given_location() {
    let t = installed().await;

    let event = t
        .add_widget("charts~1.0.0", "menu", Some(outer_right_bottom()))
        .await
        .unwrap();

    let SceneEventKind::WidgetAdded(added) = event.kind else {
        panic!("expected a WidgetAdded event");
    };
    let scene = t.scene().await;
    assert_eq!(
        scene.widget_align().find(added.widget_id),
        Some((0, outer_right_bottom()))
    );
}

#[tokio::test]
async fn test_add_widget_of_non_widget_extension_is_rejected() {
    let t = installed().await;

    let result = t.add_widget("charts~1.0.0", "table", None).await;

    assert!(matches!(
        result,
        Err(DomainError::InvalidExtensionType { .. })
    ));
    assert!(t.scene().await.widgets().all().is_empty());
}

#[tokio::test]
async fn test_add_widget_of_unknown_extension_is_rejected() {
    let t = installed().await;

    let result = t.add_widget("charts~1.0.0", "gauge", None).await;

    assert!(matches!(result, Err(DomainError::ExtensionNotFound { .. })));
}

#[tokio::test]
async fn test_add_widget_of_plugin_that_is_not_installed_is_rejected() {
    let t = TestScene::new(&[CHARTS_V1]).await;

    let result = t.add_widget("charts~1.0.0", "menu", None).await;

    assert!(matches!(result, Err(DomainError::PluginNotInstalled(_))));
}

#[tokio::test]
async fn test_widget_edits_are_allowed_while_another_edit_is_pending() {
    let t = installed().await;
    t.store
        .update_lock(t.scene_id, LockMode::Free, LockMode::Pending)
        .await
        .unwrap();

    let result = t.add_widget("charts~1.0.0", "menu", None).await;

    assert!(result.is_ok());
    assert_eq!(t.store.get_lock(t.scene_id).await.unwrap(), LockMode::Pending);
}

#[tokio::test]
async fn test_widget_edits_are_rejected_while_scene_is_publishing() {
    let t = installed().await;
    t.store
        .update_lock(t.scene_id, LockMode::Free, LockMode::Publishing)
        .await
        .unwrap();

    let result = t.add_widget("charts~1.0.0", "menu", None).await;

    assert!(matches!(result, Err(DomainError::SceneLocked(_))));
}

// --- update ---

#[tokio::test]
async fn test_update_widget_changes_flags_without_moving_it() {
    // Arrange
    let t = installed().await;
    let (widget, _) = t.place_widget("charts~1.0.0", "menu").await;
    let mut command = update(&t, widget);
    command.enabled = Some(false);
    command.extended = Some(true);

    // Act
    let event = handle_update_widget(&command, &t.operator, &t.services)
        .await
        .unwrap();

    // Assert
    let SceneEventKind::WidgetUpdated(updated) = event.kind else {
        panic!("expected a WidgetUpdated event");
    };
    assert!(!updated.enabled);
    assert!(updated.extended);
    assert_eq!(updated.location, Some(WidgetLocation::default()));
    let scene = t.scene().await;
    let stored = scene.widgets().widget(widget).unwrap();
    assert!(!stored.enabled());
    assert!(stored.extended());
}

#[tokio::test]
async fn test_update_widget_reorders_within_its_area() {
    // Arrange
    let t = installed().await;
    let (first, _) = t.place_widget("charts~1.0.0", "menu").await;
    let (second, _) = t.place_widget("charts~1.0.0", "legend").await;
    let mut command = update(&t, second);
    command.index = Some(0);

    // Act
    handle_update_widget(&command, &t.operator, &t.services)
        .await
        .unwrap();

    // Assert
    let scene = t.scene().await;
    let area = scene.widget_align().area_ref(WidgetLocation::default()).unwrap();
    assert_eq!(area.widget_ids(), &[second, first]);
}

#[tokio::test]
async fn test_update_widget_moves_it_to_another_area() {
    // Arrange
    let t = installed().await;
    let (widget, _) = t.place_widget("charts~1.0.0", "menu").await;
    let mut command = update(&t, widget);
    command.location = Some(outer_right_bottom());

    // Act
    handle_update_widget(&command, &t.operator, &t.services)
        .await
        .unwrap();

    // Assert
    let scene = t.scene().await;
    assert_eq!(
        scene.widget_align().find(widget),
        Some((0, outer_right_bottom()))
    );
    let old_area = scene.widget_align().area_ref(WidgetLocation::default());
    assert!(old_area.is_none_or(|a| a.widget_ids().is_empty()));
}

#[tokio::test]
async fn test_update_unknown_widget_is_rejected() {
    let t = installed().await;

    let command = update(&t, WidgetId::new());
    let result = handle_update_widget(&command, &t.operator, &t.services).await;

    assert!(matches!(result, Err(DomainError::WidgetNotFound(_))));
}

#[tokio::test]
async fn test_update_widget_area_sets_alignment() {
    // Arrange
    let t = installed().await;
    let command = UpdateWidgetArea {
        correlation_id: Uuid::new_v4(),
        scene_id: t.scene_id,
        location: outer_right_bottom(),
        align: WidgetAlign::End,
    };

    // Act
    handle_update_widget_area(&command, &t.operator, &t.services)
        .await
        .unwrap();

    // Assert
    let scene = t.scene().await;
    let area = scene.widget_align().area_ref(outer_right_bottom()).unwrap();
    assert_eq!(area.align(), WidgetAlign::End);
}

// --- remove ---

#[tokio::test]
async fn test_remove_widget_deletes_it_and_its_config() {
    // Arrange
    let t = installed().await;
    let (widget, property) = t.place_widget("charts~1.0.0", "menu").await;
    let command = RemoveWidget {
        correlation_id: Uuid::new_v4(),
        scene_id: t.scene_id,
        widget_id: widget,
    };

    // Act
    handle_remove_widget(&command, &t.operator, &t.services)
        .await
        .unwrap();

    // Assert
    let scene = t.scene().await;
    assert!(!scene.widgets().has(widget));
    assert_eq!(scene.widget_align().find(widget), None);
    assert!(!t.has_property(property).await);
}

#[tokio::test]
async fn test_remove_unknown_widget_is_rejected() {
    let t = installed().await;
    let command = RemoveWidget {
        correlation_id: Uuid::new_v4(),
        scene_id: t.scene_id,
        widget_id: WidgetId::new(),
    };

    let result = handle_remove_widget(&command, &t.operator, &t.services).await;

    assert!(matches!(result, Err(DomainError::WidgetNotFound(_))));
}
