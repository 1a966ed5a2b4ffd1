//! Routes for the Narrative bounded context: reading the screen and sending
//! navigation input.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use talespin_core::error::DomainError;
use talespin_narrative::application::navigation::ForwardOutcome;
use talespin_session::application::engine::EngineView;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::screen::Screen;
use crate::state::AppState;

/// Engine summary plus what the player sees.
#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub engine: EngineView,
    pub screen: Screen,
}

impl ScreenResponse {
    pub fn capture(state: &AppState) -> Self {
        Self {
            engine: state.engine.view(),
            screen: state.screen.screen(),
        }
    }
}

/// Request body for POST /choose.
#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    /// Id of the picked choice.
    pub choice_id: String,
}

/// Request body for POST /resolve-action.
#[derive(Debug, Deserialize)]
pub struct ResolveActionRequest {
    /// Value handed back to the waiting script.
    #[serde(default)]
    pub value: Value,
}

/// Request body for POST /skip.
#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ForwardResponse {
    /// `continued`, `redone` or `cancelled`.
    pub outcome: &'static str,
    #[serde(flatten)]
    pub screen: ScreenResponse,
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    /// Whether history moved back.
    pub moved: bool,
    #[serde(flatten)]
    pub screen: ScreenResponse,
}

#[derive(Debug, Serialize)]
pub struct SkipResponse {
    pub skipping: bool,
}

fn outcome_name(outcome: ForwardOutcome) -> &'static str {
    match outcome {
        ForwardOutcome::Continued => "continued",
        ForwardOutcome::Redone => "redone",
        ForwardOutcome::Cancelled => "cancelled",
    }
}

/// GET /screen
async fn get_screen(State(state): State<AppState>) -> Json<ScreenResponse> {
    Json(ScreenResponse::capture(&state))
}

/// POST /forward
#[instrument(skip(state))]
async fn forward(State(state): State<AppState>) -> Json<ForwardResponse> {
    let since = state.screen.revision();
    let outcome = state.engine.go_forward();
    if outcome != ForwardOutcome::Cancelled {
        state.settle(since).await;
    }

    Json(ForwardResponse {
        outcome: outcome_name(outcome),
        screen: ScreenResponse::capture(&state),
    })
}

/// POST /back
#[instrument(skip(state))]
async fn back(State(state): State<AppState>) -> Json<BackResponse> {
    let since = state.screen.revision();
    let moved = state.engine.go_back();
    if moved || state.engine.is_script_running() {
        state.settle(since).await;
    }

    Json(BackResponse {
        moved,
        screen: ScreenResponse::capture(&state),
    })
}

/// POST /choose
#[instrument(skip(state, request), fields(choice_id = %request.choice_id))]
async fn choose(
    State(state): State<AppState>,
    Json(request): Json<ChooseRequest>,
) -> Result<Json<ScreenResponse>, ApiError> {
    let since = state.screen.revision();
    if !state.engine.choose(&request.choice_id) {
        return Err(DomainError::InvalidOperation("no choice is pending".into()).into());
    }

    info!("choice made");
    state.settle(since).await;
    Ok(Json(ScreenResponse::capture(&state)))
}

/// POST /resolve-action
#[instrument(skip(state, request))]
async fn resolve_action(
    State(state): State<AppState>,
    Json(request): Json<ResolveActionRequest>,
) -> Result<Json<ScreenResponse>, ApiError> {
    let since = state.screen.revision();
    if !state.engine.resolve_action(request.value) {
        return Err(DomainError::InvalidOperation("no custom action is pending".into()).into());
    }

    state.settle(since).await;
    Ok(Json(ScreenResponse::capture(&state)))
}

/// POST /skip
#[instrument(skip(state, request), fields(enabled = request.enabled))]
async fn skip(
    State(state): State<AppState>,
    Json(request): Json<SkipRequest>,
) -> Json<SkipResponse> {
    if request.enabled {
        state.engine.enable_skip_mode();
    } else {
        state.engine.disable_skip_mode();
    }

    Json(SkipResponse {
        skipping: state.engine.view().skipping,
    })
}

/// Returns the router for the narrative context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/screen", get(get_screen))
        .route("/forward", post(forward))
        .route("/back", post(back))
        .route("/choose", post(choose))
        .route("/resolve-action", post(resolve_action))
        .route("/skip", post(skip))
}
