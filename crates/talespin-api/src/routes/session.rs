//! Routes for the Session bounded context: starting games and managing
//! save slots.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use talespin_core::repository::SaveSummary;
use talespin_core::script::ScriptRef;
use talespin_session::domain::snapshot::EngineStatus;
use tracing::{info, instrument};

use super::narrative::ScreenResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /saves/{slot}.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Player-facing save name.
    pub name: String,
}

/// Response body for POST /new-game.
#[derive(Debug, Serialize)]
pub struct NewGameResponse {
    /// The opening event, if one was eligible.
    pub started: Option<ScriptRef>,
    #[serde(flatten)]
    pub screen: ScreenResponse,
}

/// POST /new-game
#[instrument(skip(state))]
async fn new_game(State(state): State<AppState>) -> Json<NewGameResponse> {
    state.screen.clear();
    let since = state.screen.revision();
    let started = state.engine.new_game();
    if started.is_some() {
        state.settle(since).await;
    }

    Json(NewGameResponse {
        started,
        screen: ScreenResponse::capture(&state),
    })
}

/// GET /saves
async fn list_saves(State(state): State<AppState>) -> Result<Json<Vec<SaveSummary>>, ApiError> {
    Ok(Json(state.engine.list_saves().await?))
}

/// POST /saves/{slot}
#[instrument(skip(state, request), fields(name = %request.name))]
async fn save_game(
    State(state): State<AppState>,
    Path(slot): Path<u32>,
    Json(request): Json<SaveRequest>,
) -> Result<(StatusCode, Json<SaveSummary>), ApiError> {
    let summary = state.engine.save(slot, &request.name).await?;
    info!(slot, "game saved");
    Ok((StatusCode::CREATED, Json(summary)))
}

/// POST /saves/{slot}/load
#[instrument(skip(state))]
async fn load_game(
    State(state): State<AppState>,
    Path(slot): Path<u32>,
) -> Result<Json<ScreenResponse>, ApiError> {
    let since = state.screen.revision();
    state.engine.load(slot).await?;
    state.screen.clear();
    if state.engine.status() == EngineStatus::Loading {
        state.settle(since).await;
    }
    Ok(Json(ScreenResponse::capture(&state)))
}

/// DELETE /saves/{slot}
#[instrument(skip(state))]
async fn delete_save(
    State(state): State<AppState>,
    Path(slot): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_save(slot).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new-game", post(new_game))
        .route("/saves", get(list_saves))
        .route("/saves/{slot}", post(save_game).delete(delete_save))
        .route("/saves/{slot}/load", post(load_game))
}
