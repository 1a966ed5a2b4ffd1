//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use talespin_content::domain::pack::ContentPack;
use talespin_core::clock::Clock;
use talespin_core::config::EngineConfig;
use talespin_core::error::DomainError;
use talespin_core::presentation::Presenter;
use talespin_core::repository::SaveRepository;
use talespin_session::application::engine::Engine;

use crate::screen::ScreenPresenter;

/// How long a handler waits for the engine to present something after an
/// input.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(500);

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The game in progress.
    pub engine: Engine,
    /// What the player currently sees.
    pub screen: Arc<ScreenPresenter>,
    /// Upper bound on waiting for the engine after an input.
    pub settle_timeout: Duration,
}

impl AppState {
    /// Builds the engine for `pack`, wired to a fresh screen presenter.
    ///
    /// # Errors
    ///
    /// Returns the engine's construction error.
    pub fn new(
        pack: ContentPack,
        config: EngineConfig,
        repository: Arc<dyn SaveRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let screen = Arc::new(ScreenPresenter::new());
        let presenter: Arc<dyn Presenter> = screen.clone();
        let engine = Engine::new(pack, config, repository, clock, presenter)?;
        Ok(Self {
            engine,
            screen,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Waits for the screen to move past `since`, bounded by the settle
    /// timeout.
    pub async fn settle(&self, since: u64) {
        if !self.screen.settle(since, self.settle_timeout).await {
            tracing::debug!(since, "engine did not present anything before timeout");
        }
    }
}
