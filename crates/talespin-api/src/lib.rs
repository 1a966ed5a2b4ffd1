//! Talespin — HTTP host.
//!
//! Drives a single [`talespin_session::application::engine::Engine`] over a
//! JSON API. The library half exists so integration tests can build the same
//! router the binary serves.

use axum::Router;

pub mod demo;
pub mod error;
pub mod routes;
pub mod screen;
pub mod state;

/// Builds the full application router.
pub fn build_router(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/narrative", routes::narrative::router())
        .nest("/api/v1/world", routes::world_state::router())
        .nest("/api/v1/sessions", routes::session::router())
        .with_state(state)
}
