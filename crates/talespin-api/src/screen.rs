//! Presenter that keeps what a player would currently see.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use talespin_core::presentation::{ActionSummary, Presentation, Presenter};
use talespin_core::script::ScriptRef;
use talespin_core::sync::lock;
use tokio::sync::watch;

/// The current screen contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Screen {
    /// The pending text, choice or custom interaction.
    pub prompt: Option<Presentation>,
    /// Actions the player can take.
    pub actions: Vec<ActionSummary>,
    /// The last script that ran to completion.
    pub finished: Option<ScriptRef>,
}

/// [`Presenter`] that folds presentations into a [`Screen`].
///
/// Each suspension or script completion bumps a revision counter so request
/// handlers can wait for the engine to settle after an input.
#[derive(Debug)]
pub struct ScreenPresenter {
    screen: Mutex<Screen>,
    revision: watch::Sender<u64>,
}

impl ScreenPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Mutex::new(Screen::default()),
            revision: watch::Sender::new(0),
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        lock(&self.screen).clone()
    }

    /// Drops the prompt and the finished marker, keeping the actions.
    pub fn clear(&self) {
        let mut screen = lock(&self.screen);
        screen.prompt = None;
        screen.finished = None;
    }

    /// Current revision; pass it to [`Self::settle`] after sending input.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Waits until the screen moves past revision `since`. Returns `false`
    /// if `timeout` elapsed first.
    pub async fn settle(&self, since: u64, timeout: Duration) -> bool {
        let mut revisions = self.revision.subscribe();
        matches!(
            tokio::time::timeout(timeout, revisions.wait_for(|rev| *rev > since)).await,
            Ok(Ok(_))
        )
    }
}

impl Default for ScreenPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for ScreenPresenter {
    fn present(&self, presentation: Presentation) {
        let settled = {
            let mut screen = lock(&self.screen);
            match presentation {
                Presentation::Actions { actions } => {
                    screen.actions = actions;
                    false
                }
                Presentation::ScriptFinished { script } => {
                    screen.prompt = None;
                    screen.finished = Some(script);
                    true
                }
                Presentation::Background { .. } | Presentation::Foreground { .. } => false,
                prompt => {
                    screen.prompt = Some(prompt);
                    screen.finished = None;
                    true
                }
            }
        };
        if settled {
            self.revision.send_modify(|rev| *rev += 1);
        }
    }
}
