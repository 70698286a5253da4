//! Command Layer Integration Tests
//!
//! Commands run against a real temporary data directory and a scripted gateway.

use std::sync::Arc;

use flora_lens::commands::{
    self, IMAGE_FAILURE_MESSAGE, LOOKUP_FAILURE_MESSAGE,
};
use flora_lens::models::ReminderCategory;
use flora_lens::services::MAX_IMAGE_SIZE;
use flora_lens::state::AppState;
use flora_lens::SettingsUpdate;

use crate::support::{network_error, payload, text, ScriptedGateway, JPEG_BYTES};

async fn state_with(
    responses: Vec<flora_lens_llm::LlmResult<flora_lens_llm::GenerateResponse>>,
) -> (AppState, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let state = AppState::new();
    state
        .initialize_with_gateway(temp_dir.path(), Arc::new(ScriptedGateway::new(responses)))
        .await
        .unwrap();
    (state, temp_dir)
}

#[tokio::test]
async fn test_identify_image_records_history_with_source() {
    let (state, temp_dir) = state_with(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        network_error(),
    ])
    .await;
    let image_path = temp_dir.path().join("leaf.jpg");
    std::fs::write(&image_path, JPEG_BYTES).unwrap();

    let response = commands::identify_image(&state, &image_path).await;
    assert!(response.success, "{:?}", response.error);
    let discovery = response.data.unwrap();
    let history_id = discovery.history_id.unwrap();
    assert!(discovery.identification.map_data.is_some());

    let listed = commands::list_history(&state).await.data.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, history_id);
    assert_eq!(listed[0].health, "Needs Care");
    assert!(listed[0].has_image);

    let record = commands::get_history_record(&state, history_id)
        .await
        .data
        .unwrap();
    assert!(record
        .source_image
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_failed_identification_shows_retry_message_and_leaves_history() {
    let mut bad = payload("Swiss Cheese Plant");
    bad.as_object_mut().unwrap().remove("isWeed");
    let (state, temp_dir) = state_with(vec![text(&bad.to_string())]).await;
    let image_path = temp_dir.path().join("leaf.jpg");
    std::fs::write(&image_path, JPEG_BYTES).unwrap();

    let response = commands::identify_image(&state, &image_path).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(IMAGE_FAILURE_MESSAGE));
    assert!(commands::list_history(&state).await.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_file_is_rejected_before_any_call() {
    let (state, temp_dir) = state_with(vec![]).await;
    let path = temp_dir.path().join("notes.txt");
    std::fs::write(&path, b"not an image").unwrap();

    let response = commands::identify_image(&state, &path).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Unsupported image format"));
}

#[tokio::test]
async fn test_oversized_photo_is_rejected_before_any_call() {
    let gateway = Arc::new(ScriptedGateway::new(vec![]));
    let temp_dir = tempfile::tempdir().unwrap();
    let state = AppState::new();
    state
        .initialize_with_gateway(temp_dir.path(), gateway.clone())
        .await
        .unwrap();

    let path = temp_dir.path().join("huge.jpg");
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(MAX_IMAGE_SIZE + 1).unwrap();
    drop(file);

    let response = commands::identify_image(&state, &path).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("too large"));
    assert!(gateway.requests().is_empty());
    assert!(commands::list_history(&state).await.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_records_only_when_saved() {
    let (state, _temp_dir) = state_with(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        text("Central America."),
        text(&payload("Swiss Cheese Plant").to_string()),
        text("Central America."),
    ])
    .await;

    let unsaved = commands::lookup_plant(&state, "Monstera", false).await;
    assert!(unsaved.data.unwrap().history_id.is_none());
    assert!(commands::list_history(&state).await.data.unwrap().is_empty());

    let saved = commands::lookup_plant(&state, "Monstera", true).await;
    assert!(saved.data.unwrap().history_id.is_some());
    assert_eq!(commands::list_history(&state).await.data.unwrap().len(), 1);
}

#[tokio::test]
async fn test_lookup_failure_and_blank_name() {
    let (state, _temp_dir) = state_with(vec![network_error()]).await;

    let blank = commands::lookup_plant(&state, "   ", false).await;
    assert!(!blank.success);

    let failed = commands::lookup_plant(&state, "Monstera", false).await;
    assert_eq!(failed.error.as_deref(), Some(LOOKUP_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_second_identification_is_rejected_while_in_flight() {
    let (state, _temp_dir) = state_with(vec![]).await;
    let _guard = state.begin_identification().unwrap();

    let response = commands::lookup_plant(&state, "Monstera", false).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("already in progress"));
}

#[tokio::test]
async fn test_remove_history_requires_known_id() {
    let (state, _temp_dir) = state_with(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        text("Central America."),
    ])
    .await;
    let id = commands::lookup_plant(&state, "Monstera", true)
        .await
        .data
        .unwrap()
        .history_id
        .unwrap();

    assert_eq!(commands::remove_history_record(&state, id + 1).await.data, Some(false));
    assert_eq!(commands::list_history(&state).await.data.unwrap().len(), 1);
    assert_eq!(commands::remove_history_record(&state, id).await.data, Some(true));
    assert!(commands::list_history(&state).await.data.unwrap().is_empty());
    assert!(!commands::get_history_record(&state, id).await.success);
}

#[tokio::test]
async fn test_reminder_lifecycle() {
    let (state, _temp_dir) = state_with(vec![
        text(&payload("Swiss Cheese Plant").to_string()),
        text("Central America."),
    ])
    .await;
    let history_id = commands::lookup_plant(&state, "Monstera", true)
        .await
        .data
        .unwrap()
        .history_id
        .unwrap();

    let accepted = commands::accept_suggested_reminder(&state, history_id, 0)
        .await
        .data
        .unwrap();
    assert_eq!(accepted.category, ReminderCategory::Hydration);
    assert_eq!(accepted.plant_name, "Swiss Cheese Plant");

    assert!(!commands::accept_suggested_reminder(&state, history_id, 9).await.success);

    let manual = commands::add_reminder(&state, "Fern", "Rotate for even light")
        .await
        .data
        .unwrap();
    assert_eq!(manual.category, ReminderCategory::Light);

    let toggled = commands::toggle_reminder(&state, &manual.id).await.data.unwrap();
    assert!(toggled.done);

    let listed = commands::list_reminders(&state).await.data.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, manual.id);

    assert_eq!(commands::remove_reminder(&state, &manual.id).await.data, Some(true));
    assert_eq!(commands::list_reminders(&state).await.data.unwrap().len(), 1);
}

#[tokio::test]
async fn test_settings_and_health() {
    let (state, _temp_dir) = state_with(vec![]).await;

    let health = commands::get_health(&state, false).await.data.unwrap();
    assert_eq!(health.status, "healthy");
    assert!(health.database && health.config && health.api_key);
    assert_eq!(health.model.as_deref(), Some("scripted-model"));
    assert!(health.gateway_reachable.is_none());

    let probed = commands::get_health(&state, true).await.data.unwrap();
    assert_eq!(probed.gateway_reachable, Some(true));
    assert_eq!(probed.status, "healthy");

    let updated = commands::update_settings(
        &state,
        SettingsUpdate {
            reminder_due_hours: Some(48),
            ..Default::default()
        },
    )
    .await
    .data
    .unwrap();
    assert_eq!(updated.reminder_due_hours, 48);
    assert_eq!(
        commands::get_settings(&state).await.data.unwrap().reminder_due_hours,
        48
    );

    let restored = commands::reset_settings(&state).await.data.unwrap();
    assert_eq!(restored.reminder_due_hours, 24);
    let reminder = commands::add_reminder(&state, "Fern", "Mist the fronds")
        .await
        .data
        .unwrap();
    assert_eq!(
        (reminder.due_at - chrono::Utc::now()).num_hours(),
        23,
        "due time follows the restored default"
    );

    let invalid = commands::update_settings(
        &state,
        SettingsUpdate {
            endpoint: Some("not-a-url".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(!invalid.success);
}

#[tokio::test]
async fn test_failed_probe_degrades_health() {
    let temp_dir = tempfile::tempdir().unwrap();
    let state = AppState::new();
    state
        .initialize_with_gateway(temp_dir.path(), Arc::new(ScriptedGateway::unreachable()))
        .await
        .unwrap();

    let unprobed = commands::get_health(&state, false).await.data.unwrap();
    assert_eq!(unprobed.status, "healthy");

    let probed = commands::get_health(&state, true).await.data.unwrap();
    assert_eq!(probed.gateway_reachable, Some(false));
    assert_eq!(probed.status, "degraded");
}
