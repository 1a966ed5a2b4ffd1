//! Routes for the World State bounded context.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;
use talespin_core::presentation::ActionSummary;
use talespin_core::script::ScriptRef;
use talespin_core::world::WorldState;
use tracing::{info, instrument};

use super::narrative::ScreenResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /actions/{id}/execute.
#[derive(Debug, Serialize)]
pub struct ExecuteActionResponse {
    /// The event the action triggered, if any.
    pub started: Option<ScriptRef>,
    #[serde(flatten)]
    pub screen: ScreenResponse,
}

/// GET /
async fn get_world(State(state): State<AppState>) -> Json<WorldState> {
    Json(state.engine.world())
}

/// GET /actions
async fn list_actions(State(state): State<AppState>) -> Json<Vec<ActionSummary>> {
    Json(state.engine.accessible_actions())
}

/// POST /actions/{id}/execute
#[instrument(skip(state))]
async fn execute_action(
    State(state): State<AppState>,
    Path(action_id): Path<String>,
) -> Result<Json<ExecuteActionResponse>, ApiError> {
    let since = state.screen.revision();
    let started = state.engine.execute_action(&action_id)?;

    if let Some(event) = &started {
        info!(%event, "action triggered an event");
        state.settle(since).await;
    }

    Ok(Json(ExecuteActionResponse {
        started,
        screen: ScreenResponse::capture(&state),
    }))
}

/// Returns the router for the world state context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_world))
        .route("/actions", get(list_actions))
        .route("/actions/{action_id}/execute", post(execute_action))
}
