//! Runs authored scripts, counts their suspension steps, and resumes them
//! mid-script by replay.
//!
//! No continuation is ever serialized. To resume a script at step `n`, the
//! scheduler restores the world the script started from, runs it again from
//! the top, and answers its first `n` suspension calls immediately with the
//! replies recorded the first time round. The `n + 1`-th call is presented to
//! the player as usual.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use talespin_content::application::registry::EventRegistry;
use talespin_content::domain::script::ScriptApi;
use talespin_core::error::DomainError;
use talespin_core::interrupt::{Interrupt, ScriptOutcome};
use talespin_core::presentation::{Presentation, Presenter};
use talespin_core::script::{Bookmark, ScriptRef};
use talespin_core::sync::lock;
use talespin_core::world::{StateHandle, WorldState};
use talespin_narrative::application::navigation::NavigationController;
use talespin_narrative::domain::history::HistoryEntry;
use tracing::{debug, info, instrument};

use super::script_api::LiveScriptApi;
use crate::domain::snapshot::EngineSnapshot;

/// Where and how to start a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    /// Script to run.
    pub target: ScriptRef,
    /// World to restore before running.
    pub checkpoint: WorldState,
    /// Number of suspension calls to replay before going live.
    pub target_step: u32,
    /// Replies to hand back during replay, oldest first.
    pub replies: Vec<Value>,
}

impl Launch {
    /// Runs `target` from the top with no replay.
    #[must_use]
    pub fn fresh(target: ScriptRef, checkpoint: WorldState) -> Self {
        Self {
            target,
            checkpoint,
            target_step: 0,
            replies: Vec::new(),
        }
    }

    /// Resumes at the point a history entry was recorded.
    #[must_use]
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            target: entry.target.clone(),
            checkpoint: entry.checkpoint.clone(),
            target_step: entry.step,
            replies: entry.replies.clone(),
        }
    }

    /// Resumes at `bookmark`, if it points at a script.
    #[must_use]
    pub fn from_bookmark(bookmark: Bookmark, checkpoint: WorldState) -> Option<Self> {
        Some(Self {
            target: bookmark.current_event?,
            checkpoint,
            target_step: bookmark.current_step,
            replies: bookmark.replies,
        })
    }
}

/// Shared engine handles a running script works against.
#[derive(Clone)]
pub struct ScriptContext {
    pub navigation: NavigationController,
    pub state: StateHandle,
    pub snapshot: Arc<Mutex<EngineSnapshot>>,
    pub presenter: Arc<dyn Presenter>,
}

/// Step bookkeeping of the script currently running.
#[derive(Debug, Default)]
pub(crate) struct Cursor {
    /// Incremented on every launch and reset; identifies the live script.
    pub(crate) run_id: u64,
    pub(crate) script: Option<ScriptRef>,
    /// Completed suspension calls.
    pub(crate) step: u32,
    pub(crate) target_step: u32,
    pub(crate) replay: bool,
    /// Replies from the launch, consumed during replay.
    pub(crate) recorded: Vec<Value>,
    /// Replies of the calls completed in this run.
    pub(crate) replies: Vec<Value>,
    /// World the script started from.
    pub(crate) checkpoint: WorldState,
    /// Set once the script has been told to stop.
    pub(crate) abandoned: Option<Interrupt>,
}

impl Cursor {
    /// Returns `true` if the next suspension call should be answered without
    /// the player.
    pub(crate) fn replaying(&self) -> bool {
        self.replay && self.step < self.target_step
    }

    pub(crate) fn recorded_reply(&self) -> Value {
        usize::try_from(self.step)
            .ok()
            .and_then(|i| self.recorded.get(i))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Marks the current suspension call as completed with `reply`.
    pub(crate) fn complete(&mut self, reply: Value) {
        self.replies.push(reply);
        self.step += 1;
        if self.replay && self.step >= self.target_step {
            self.replay = false;
            info!(step = self.step, "replay reached bookmark");
        }
    }
}

/// Invokes authored scripts one at a time.
pub struct EventScheduler {
    registry: Arc<EventRegistry>,
    cursor: Arc<Mutex<Cursor>>,
    context: ScriptContext,
}

impl EventScheduler {
    #[must_use]
    pub fn new(registry: Arc<EventRegistry>, context: ScriptContext) -> Self {
        Self {
            registry,
            cursor: Arc::new(Mutex::new(Cursor::default())),
            context,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Position of the running script. Empty when nothing runs.
    #[must_use]
    pub fn bookmark(&self) -> Bookmark {
        let cursor = lock(&self.cursor);
        match &cursor.script {
            Some(script) => Bookmark {
                current_event: Some(script.clone()),
                current_step: cursor.step,
                replies: cursor.replies.clone(),
            },
            None => Bookmark::default(),
        }
    }

    /// World the running script started from.
    #[must_use]
    pub fn checkpoint(&self) -> Option<WorldState> {
        let cursor = lock(&self.cursor);
        cursor.script.as_ref().map(|_| cursor.checkpoint.clone())
    }

    /// Returns `true` while a script is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.cursor).script.is_some()
    }

    /// Returns `true` while the running script is being replayed.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        lock(&self.cursor).replaying()
    }

    /// Forgets the running script. Its script API goes stale.
    pub fn reset(&self) {
        let mut cursor = lock(&self.cursor);
        *cursor = Cursor {
            run_id: cursor.run_id + 1,
            ..Cursor::default()
        };
    }

    /// Runs one script to its end.
    ///
    /// Restores `launch.checkpoint` into the world, then replays
    /// `launch.target_step` suspension calls before going live.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Lookup` if the script is unknown. Nothing is
    /// changed in that case.
    #[instrument(skip(self, launch), fields(script = %launch.target, target_step = launch.target_step))]
    pub async fn run(&self, launch: Launch) -> Result<ScriptOutcome, DomainError> {
        let script = self.registry.resolve(&launch.target)?;
        let Launch {
            target,
            checkpoint,
            target_step,
            replies,
        } = launch;

        self.context.state.replace(checkpoint.clone());
        let run_id = {
            let mut cursor = lock(&self.cursor);
            let run_id = cursor.run_id + 1;
            *cursor = Cursor {
                run_id,
                script: Some(target.clone()),
                target_step,
                replay: target_step > 0,
                recorded: replies,
                checkpoint,
                ..Cursor::default()
            };
            run_id
        };
        info!("script started");

        let api: Arc<dyn ScriptApi> = Arc::new(LiveScriptApi::new(
            run_id,
            Arc::clone(&self.cursor),
            self.context.clone(),
        ));
        let returned = script(api).await;

        let abandoned = {
            let mut cursor = lock(&self.cursor);
            if cursor.run_id == run_id {
                cursor.script = None;
                cursor.replay = false;
                cursor.abandoned.take()
            } else {
                Some(Interrupt::Navigation)
            }
        };

        // A script that swallowed its interrupt still counts as interrupted.
        let outcome = match (returned, abandoned) {
            (Err(interrupt), _) | (Ok(()), Some(interrupt)) => ScriptOutcome::Interrupted(interrupt),
            (Ok(()), None) => ScriptOutcome::Completed,
        };

        match &outcome {
            ScriptOutcome::Completed => {
                info!("script completed");
                self.context
                    .presenter
                    .present(Presentation::ScriptFinished { script: target });
            }
            ScriptOutcome::Interrupted(interrupt) => debug!(%interrupt, "script interrupted"),
        }
        Ok(outcome)
    }
}
