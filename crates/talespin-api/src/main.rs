//! Talespin API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use talespin_api::error::AppError;
use talespin_api::state::AppState;
use talespin_api::{build_router, demo};
use talespin_core::clock::SystemClock;
use talespin_core::config::EngineConfig;
use talespin_save_store::file_save_repository::FileSaveRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Talespin API server");

    // Read configuration from environment.
    let config = EngineConfig::from_env()?;
    let save_dir = std::env::var("TALESPIN_SAVE_DIR").unwrap_or_else(|_| "saves".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

    tracing::info!(project_id = %config.project_id, save_dir = %save_dir, "engine configured");

    // Build application state.
    let app_state = AppState::new(
        demo::content_pack()?,
        config,
        Arc::new(FileSaveRepository::new(save_dir)),
        Arc::new(SystemClock),
    )?;

    let app = build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
