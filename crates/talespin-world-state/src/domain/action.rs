//! Player-triggered world actions.

use std::fmt;
use std::sync::Arc;

use talespin_core::presentation::ActionSummary;
use talespin_core::world::{Predicate, WorldState};

/// Effect an action applies to the world.
pub type ActionEffect = Arc<dyn Fn(&mut WorldState) + Send + Sync>;

/// A player action: a name, an availability predicate and an effect.
///
/// Actions are stateless apart from what their closures capture.
#[derive(Clone)]
pub struct Action {
    id: String,
    name: String,
    unlocked: Predicate,
    execute: ActionEffect,
}

impl Action {
    /// Creates an action that is always unlocked.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        execute: impl Fn(&mut WorldState) + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unlocked: Arc::new(|_: &WorldState| true),
            execute: Arc::new(execute),
        }
    }

    /// Restricts the action to worlds where `unlocked` holds.
    #[must_use]
    pub fn with_unlocked(
        mut self,
        unlocked: impl Fn(&WorldState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.unlocked = Arc::new(unlocked);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the action may run against `state`.
    #[must_use]
    pub fn is_unlocked(&self, state: &WorldState) -> bool {
        (self.unlocked)(state)
    }

    /// Applies the action's effect. Availability is the caller's concern.
    pub fn execute(&self, state: &mut WorldState) {
        (self.execute)(state);
    }

    /// Display summary of the action.
    #[must_use]
    pub fn summary(&self) -> ActionSummary {
        ActionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_action_is_unlocked_by_default() {
        let action = Action::new("rest", "Rest", |s| s.clock.advance(60));

        assert!(action.is_unlocked(&WorldState::default()));
    }

    #[test]
    fn test_with_unlocked_gates_on_world() {
        // Arrange
        let action = Action::new("open_gate", "Open the gate", |s| s.set_flag("gate_open", true))
            .with_unlocked(|s| s.is_flag_set("has_key"));
        let mut state = WorldState::default();

        // Act
        let before = action.is_unlocked(&state);
        state.set_flag("has_key", true);

        // Assert
        assert!(!before);
        assert!(action.is_unlocked(&state));
    }

    #[test]
    fn test_execute_applies_effect() {
        let action = Action::new("rest", "Rest", |s| s.clock.advance(90));
        let mut state = WorldState::default();

        action.execute(&mut state);

        assert_eq!(state.clock.minute, 90);
        assert_eq!(action.summary().name, "Rest");
    }
}
