//! Test presenters — observe what the engine shows the player.

use std::time::Duration;

use talespin_core::presentation::{Presentation, Presenter};
use tokio::sync::mpsc;

/// How long `PresentationReceiver` waits before declaring a test hung.
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

/// A presenter that forwards presentations over a channel so async tests can
/// wait for the engine to reach a suspension point.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<Presentation>,
}

impl ChannelPresenter {
    /// Create a presenter and the receiving end tests read from.
    #[must_use]
    pub fn channel() -> (Self, PresentationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, PresentationReceiver { rx })
    }
}

impl Presenter for ChannelPresenter {
    fn present(&self, presentation: Presentation) {
        // The receiver may already be gone at the end of a test.
        let _ = self.tx.send(presentation);
    }
}

/// Receiving end of a [`ChannelPresenter`].
#[derive(Debug)]
pub struct PresentationReceiver {
    rx: mpsc::UnboundedReceiver<Presentation>,
}

impl PresentationReceiver {
    /// Waits for the next presentation of any kind.
    ///
    /// # Panics
    ///
    /// Panics if nothing arrives within two seconds.
    pub async fn next(&mut self) -> Presentation {
        tokio::time::timeout(RECEIVE_TIMEOUT, self.rx.recv())
            .await
            .expect("timed out waiting for a presentation")
            .expect("presenter dropped")
    }

    /// Waits for the next presentation that blocks on player input,
    /// skipping backgrounds, action refreshes and the like.
    ///
    /// # Panics
    ///
    /// Panics if no suspension arrives within the timeout.
    pub async fn next_suspension(&mut self) -> Presentation {
        loop {
            let presentation = self.next().await;
            if presentation.is_suspension() {
                return presentation;
            }
        }
    }

    /// Waits for the next `ScriptFinished` presentation.
    ///
    /// # Panics
    ///
    /// Panics if none arrives within the timeout.
    pub async fn next_finished(&mut self) -> Presentation {
        loop {
            let presentation = self.next().await;
            if matches!(presentation, Presentation::ScriptFinished { .. }) {
                return presentation;
            }
        }
    }
}
