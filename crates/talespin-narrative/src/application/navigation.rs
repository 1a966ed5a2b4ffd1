//! Reconciles player navigation intents against pending suspensions.
//!
//! Forward and back are not aimed at a particular gate. The controller works
//! out which gate is live, applies the matching history move, and then
//! releases or cancels the waiting script.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use talespin_core::sync::lock;
use tracing::debug;

use crate::domain::gate::SuspensionGate;
use crate::domain::history::HistoryStore;

/// Which branch a [`NavigationController::go_forward`] call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// A pending continue was resolved.
    Continued,
    /// A pending choice was skipped over by redoing from history.
    Redone,
    /// Nothing was pending or redoable; both gates were cancelled.
    Cancelled,
}

/// Owns the continue, choice and custom-action gates.
///
/// Resolving the continue gate advances the history cursor before the
/// waiting script resumes.
#[derive(Debug, Clone)]
pub struct NavigationController {
    continue_gate: SuspensionGate<()>,
    choice_gate: SuspensionGate<String>,
    action_gate: SuspensionGate<Value>,
    history: Arc<Mutex<HistoryStore>>,
}

impl NavigationController {
    /// Creates a controller over `history`.
    #[must_use]
    pub fn new(history: Arc<Mutex<HistoryStore>>, skip_delay: Duration) -> Self {
        let redo = Arc::clone(&history);
        let continue_gate = SuspensionGate::new("continue", skip_delay).with_on_resolve(move || {
            lock(&redo).go_forward();
        });

        Self {
            continue_gate,
            choice_gate: SuspensionGate::new("choice", skip_delay),
            action_gate: SuspensionGate::new("action", skip_delay),
            history,
        }
    }

    /// Advances the narrative.
    pub fn go_forward(&self) -> ForwardOutcome {
        if self.continue_gate.has_waiter() && self.continue_gate.resolve(()) {
            return ForwardOutcome::Continued;
        }

        if self.choice_gate.has_waiter() {
            let redone = {
                let mut history = lock(&self.history);
                history.can_go_forward() && history.go_forward()
            };
            if redone {
                debug!("choice already made in history, redoing past it");
                self.choice_gate.reject();
                return ForwardOutcome::Redone;
            }
        }

        self.continue_gate.reject();
        self.choice_gate.reject();
        ForwardOutcome::Cancelled
    }

    /// Steps back in history and interrupts any pending continue or choice,
    /// whether or not the cursor moved. Returns `true` if it moved.
    pub fn go_back(&self) -> bool {
        let moved = lock(&self.history).go_back();
        self.continue_gate.reject();
        self.choice_gate.reject();
        moved
    }

    /// Picks a choice. Returns `false` if no choice is pending.
    pub fn choose(&self, choice_id: impl Into<String>) -> bool {
        self.choice_gate.resolve(choice_id.into())
    }

    /// Completes a custom action. Returns `false` if none is pending.
    pub fn resolve_action(&self, value: Value) -> bool {
        self.action_gate.resolve(value)
    }

    /// Rejects all three gates so no stale script survives a new game or a
    /// load.
    pub fn reject_waiters(&self) {
        self.continue_gate.reject();
        self.choice_gate.reject();
        self.action_gate.reject();
    }

    /// Turns on fast-forward. Only continue waits are skipped.
    pub fn enable_skip_mode(&self) {
        self.continue_gate.enable_skip();
    }

    /// Turns off fast-forward.
    pub fn disable_skip_mode(&self) {
        self.continue_gate.disable_skip();
    }

    /// Returns `true` while fast-forward is on.
    #[must_use]
    pub fn is_skipping(&self) -> bool {
        self.continue_gate.is_skipping()
    }

    /// Returns `true` if any gate has a pending waiter.
    #[must_use]
    pub fn has_waiter(&self) -> bool {
        self.continue_gate.has_waiter()
            || self.choice_gate.has_waiter()
            || self.action_gate.has_waiter()
    }

    #[must_use]
    pub fn continue_gate(&self) -> &SuspensionGate<()> {
        &self.continue_gate
    }

    #[must_use]
    pub fn choice_gate(&self) -> &SuspensionGate<String> {
        &self.choice_gate
    }

    #[must_use]
    pub fn action_gate(&self) -> &SuspensionGate<Value> {
        &self.action_gate
    }

    /// The history store the controller navigates.
    #[must_use]
    pub fn history(&self) -> &Arc<Mutex<HistoryStore>> {
        &self.history
    }
}
