//! Computes and executes the player actions accessible in the current world.
//!
//! The accessible set is a cache: it is recomputed only when
//! [`ActionResolver::update_accessible`] is called, never reactively.

use std::fmt;
use std::sync::Arc;

use talespin_core::error::DomainError;
use talespin_core::presentation::ActionSummary;
use talespin_core::world::WorldState;
use tracing::debug;

use crate::domain::action::Action;
use crate::domain::location::{LocationLinker, LocationRegistry};

/// Hook run after every recomputation (UI refresh).
pub type UpdateCallback = Arc<dyn Fn(&[ActionSummary]) + Send + Sync>;

/// Merges global and location actions and filters them by availability.
pub struct ActionResolver {
    global: Vec<Action>,
    locations: LocationRegistry,
    accessible: Vec<Action>,
    on_update: Option<UpdateCallback>,
}

impl ActionResolver {
    #[must_use]
    pub fn new(global: Vec<Action>, locations: LocationRegistry) -> Self {
        Self {
            global,
            locations,
            accessible: Vec::new(),
            on_update: None,
        }
    }

    /// Lets `linker` wire up the location graph.
    ///
    /// # Errors
    ///
    /// Returns whatever error the linker reports.
    pub fn link_locations(&mut self, linker: &dyn LocationLinker) -> Result<(), DomainError> {
        linker.init_links(&mut self.locations)
    }

    /// Registers the hook invoked after each [`Self::update_accessible`].
    pub fn on_update(&mut self, callback: impl Fn(&[ActionSummary]) + Send + Sync + 'static) {
        self.on_update = Some(Arc::new(callback));
    }

    #[must_use]
    pub fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    /// Global actions followed by the actions of the player's location. A
    /// local action replaces a global one with the same id in place.
    fn merged(&self, state: &WorldState) -> Vec<Action> {
        let mut merged = self.global.clone();
        let local = state
            .location
            .as_deref()
            .map(|id| self.locations.local_actions(id))
            .unwrap_or_default();

        for action in local {
            match merged.iter_mut().find(|existing| existing.id() == action.id()) {
                Some(existing) => *existing = action,
                None => merged.push(action),
            }
        }
        merged
    }

    /// Recomputes and caches the accessible actions, then runs the update
    /// hook.
    pub fn update_accessible(&mut self, state: &WorldState) -> &[Action] {
        self.accessible = self
            .merged(state)
            .into_iter()
            .filter(|action| action.is_unlocked(state))
            .collect();
        debug!(count = self.accessible.len(), "accessible actions updated");

        if let Some(callback) = &self.on_update {
            callback(&self.summaries());
        }
        &self.accessible
    }

    /// The set computed by the last [`Self::update_accessible`].
    #[must_use]
    pub fn accessible(&self) -> &[Action] {
        &self.accessible
    }

    /// Display summaries of the cached accessible set.
    #[must_use]
    pub fn summaries(&self) -> Vec<ActionSummary> {
        self.accessible.iter().map(Action::summary).collect()
    }

    /// Runs action `id` against `state`.
    ///
    /// The id is looked up in the actions merged for `state` rather than the
    /// cache, and availability is checked again in case the caller's view is
    /// stale.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Lookup` if no such action exists here, or
    /// `DomainError::InvalidOperation` if it is no longer unlocked.
    pub fn execute_action(&self, id: &str, state: &mut WorldState) -> Result<(), DomainError> {
        let action = self
            .merged(state)
            .into_iter()
            .find(|action| action.id() == id)
            .ok_or_else(|| DomainError::Lookup(format!("unknown action: {id}")))?;

        if !action.is_unlocked(state) {
            return Err(DomainError::InvalidOperation(format!(
                "action {id} is no longer unlocked"
            )));
        }

        debug!(action = id, "executing action");
        action.execute(state);
        Ok(())
    }
}

impl fmt::Debug for ActionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionResolver")
            .field("global", &self.global)
            .field("locations", &self.locations)
            .field("accessible", &self.accessible)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::location::{Location, StaticLinks};

    fn resolver() -> ActionResolver {
        let global = vec![
            Action::new("rest", "Rest", |s| s.clock.advance(60)),
            Action::new("look", "Look around", |s| s.set_flag("looked", true)),
            Action::new("pray", "Pray", |s| s.set_flag("blessed", true))
                .with_unlocked(|s| s.is_flag_set("devout")),
        ];

        let mut locations = LocationRegistry::new();
        locations
            .insert(
                Location::new("harbor", "The Harbor").with_action(Action::new(
                    "look",
                    "Watch the ships",
                    |s| s.set_flag("watched_ships", true),
                )),
            )
            .unwrap();
        locations
            .insert(Location::new("market", "The Market"))
            .unwrap();

        let mut resolver = ActionResolver::new(global, locations);
        resolver
            .link_locations(&StaticLinks::new().with("harbor", "market"))
            .unwrap();
        resolver
    }

    fn at(location: &str) -> WorldState {
        WorldState {
            location: Some(location.to_owned()),
            ..WorldState::default()
        }
    }

    fn ids(actions: &[Action]) -> Vec<&str> {
        actions.iter().map(Action::id).collect()
    }

    #[test]
    fn test_update_accessible_merges_and_filters() {
        // Arrange
        let mut resolver = resolver();

        // Act
        let accessible = resolver.update_accessible(&at("harbor"));

        // Assert
        assert_eq!(ids(accessible), vec!["rest", "look", "travel:market"]);
        assert_eq!(accessible[1].name(), "Watch the ships");
    }

    #[test]
    fn test_update_accessible_without_location_uses_globals_only() {
        let mut resolver = resolver();

        let accessible = resolver.update_accessible(&WorldState::default());

        assert_eq!(ids(accessible), vec!["rest", "look"]);
    }

    #[test]
    fn test_accessible_is_not_reactive() {
        // Arrange
        let mut resolver = resolver();
        let mut state = at("harbor");
        resolver.update_accessible(&state);

        // Act
        state.set_flag("devout", true);

        // Assert
        assert!(!ids(resolver.accessible()).contains(&"pray"));
        resolver.update_accessible(&state);
        assert!(ids(resolver.accessible()).contains(&"pray"));
    }

    #[test]
    fn test_update_accessible_invokes_callback() {
        // Arrange
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut resolver = resolver();
        resolver.on_update(move |summaries| {
            sink.lock().unwrap().push(summaries.len());
        });

        // Act
        resolver.update_accessible(&at("market"));

        // Assert
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn test_execute_action_runs_local_override() {
        let resolver = resolver();
        let mut state = at("harbor");

        resolver.execute_action("look", &mut state).unwrap();

        assert!(state.is_flag_set("watched_ships"));
        assert!(!state.is_flag_set("looked"));
    }

    #[test]
    fn test_execute_travel_moves_player() {
        let resolver = resolver();
        let mut state = at("harbor");

        resolver.execute_action("travel:market", &mut state).unwrap();

        assert!(state.is_at("market"));
    }

    #[test]
    fn test_execute_unknown_action_fails_with_lookup() {
        let resolver = resolver();
        let mut state = at("market");

        let result = resolver.execute_action("fly", &mut state);

        assert!(matches!(result, Err(DomainError::Lookup(_))));
    }

    #[test]
    fn test_execute_locked_action_fails_with_invalid_operation() {
        // Arrange
        let mut resolver = resolver();
        let mut state = at("market");
        state.set_flag("devout", true);
        resolver.update_accessible(&state);
        state.set_flag("devout", false);

        // Act
        let result = resolver.execute_action("pray", &mut state);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
        assert!(!state.is_flag_set("blessed"));
    }
}
