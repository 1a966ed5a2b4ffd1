//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use talespin_core::config::EngineConfig;
use talespin_core::repository::SaveRepository;
use talespin_test_support::{FixedClock, InMemorySaveRepository, fixed_now};
use tower::ServiceExt;

use talespin_api::state::AppState;
use talespin_api::{build_router, demo};

/// Build app state over the demo pack with a deterministic clock.
pub fn test_state_with(repository: Arc<dyn SaveRepository>) -> AppState {
    let config = EngineConfig {
        project_id: "demo".to_string(),
        skip_delay: Duration::from_millis(5),
        ..EngineConfig::default()
    };
    AppState::new(
        demo::content_pack().unwrap(),
        config,
        repository,
        Arc::new(FixedClock(fixed_now())),
    )
    .unwrap()
    .with_settle_timeout(Duration::from_secs(2))
}

pub fn test_state() -> AppState {
    test_state_with(Arc::new(InMemorySaveRepository::new()))
}

/// Build the full app router, the same way `main.rs` does.
pub fn build_test_app(state: AppState) -> Router {
    build_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Start a new game and advance to the prologue choice.
pub async fn reach_prologue_choice(state: &AppState) {
    let (status, json) = post_empty(build_test_app(state.clone()), "/api/v1/sessions/new-game").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["screen"]["prompt"]["text"], "Fog rolls in over the harbor.");

    post_empty(build_test_app(state.clone()), "/api/v1/narrative/forward").await;
    let (_, json) = post_empty(build_test_app(state.clone()), "/api/v1/narrative/forward").await;
    assert_eq!(json["screen"]["prompt"]["type"], "choices");
}

/// Play the prologue to its end by turning the keeper down.
pub async fn finish_prologue(state: &AppState) {
    reach_prologue_choice(state).await;
    let (status, json) = post_json(
        build_test_app(state.clone()),
        "/api/v1/narrative/choose",
        &serde_json::json!({ "choice_id": "refuse" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["screen"]["prompt"]["text"],
        "Suit yourself. The light won't keep itself."
    );

    let (_, json) = post_empty(build_test_app(state.clone()), "/api/v1/narrative/forward").await;
    assert_eq!(json["screen"]["finished"]["eventId"], "prologue");
    assert_eq!(json["engine"]["script_running"], false);
}
