//! Integration tests for the Session bounded context.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use talespin_save_store::file_save_repository::FileSaveRepository;
use tempfile::TempDir;

#[tokio::test]
async fn test_save_then_load_resumes_at_saved_line() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let state = common::test_state_with(Arc::new(FileSaveRepository::new(dir.path())));
    common::post_empty(common::build_test_app(state.clone()), "/api/v1/sessions/new-game").await;
    common::post_empty(common::build_test_app(state.clone()), "/api/v1/narrative/forward").await;

    let (status, json) = common::post_json(
        common::build_test_app(state.clone()),
        "/api/v1/sessions/saves/1",
        &json!({ "name": "On the pier" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["slot"], 1);
    assert_eq!(json["name"], "On the pier");

    common::post_empty(common::build_test_app(state.clone()), "/api/v1/narrative/forward").await;

    // Act
    let (status, json) = common::post_empty(
        common::build_test_app(state.clone()),
        "/api/v1/sessions/saves/1/load",
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["screen"]["prompt"]["text"], "You came. I wasn't sure you would.");
    assert_eq!(json["engine"]["status"], "RUNNING");
    assert_eq!(json["engine"]["bookmark"]["currentStep"], 1);
    assert!(dir.path().join("demo").join("slot-1.json").exists());
}

#[tokio::test]
async fn test_load_into_fresh_server_restores_game() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let first = common::test_state_with(Arc::new(FileSaveRepository::new(dir.path())));
    common::reach_prologue_choice(&first).await;
    common::post_json(
        common::build_test_app(first),
        "/api/v1/sessions/saves/2",
        &json!({ "name": "Decision time" }),
    )
    .await;

    // Act
    let second = common::test_state_with(Arc::new(FileSaveRepository::new(dir.path())));
    let (status, json) = common::post_empty(
        common::build_test_app(second.clone()),
        "/api/v1/sessions/saves/2/load",
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["screen"]["prompt"]["type"], "choices");
    assert_eq!(json["screen"]["prompt"]["step"], 2);
    let (_, json) = common::post_json(
        common::build_test_app(second),
        "/api/v1/narrative/choose",
        &json!({ "choice_id": "help" }),
    )
    .await;
    assert_eq!(json["screen"]["prompt"]["text"], "Then meet me at the lighthouse.");
}

#[tokio::test]
async fn test_load_empty_slot_returns_404() {
    let state = common::test_state();

    let (status, json) =
        common::post_empty(common::build_test_app(state), "/api/v1/sessions/saves/7/load").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "save_not_found");
}

#[tokio::test]
async fn test_list_and_delete_saves() {
    // Arrange
    let state = common::test_state();
    common::post_empty(common::build_test_app(state.clone()), "/api/v1/sessions/new-game").await;
    for (slot, name) in [(3, "third"), (1, "first")] {
        common::post_json(
            common::build_test_app(state.clone()),
            &format!("/api/v1/sessions/saves/{slot}"),
            &json!({ "name": name }),
        )
        .await;
    }

    // Act
    let (status, _) =
        common::delete(common::build_test_app(state.clone()), "/api/v1/sessions/saves/3").await;
    let (_, json) = common::get_json(common::build_test_app(state), "/api/v1/sessions/saves").await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    let saves = json.as_array().unwrap();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0]["slot"], 1);
    assert_eq!(saves[0]["name"], "first");
    assert_eq!(saves[0]["timestamp"], "2026-01-15T10:00:00Z");
}
