//! Authored events.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use talespin_core::interrupt::ScriptResult;
use talespin_core::world::{Predicate, WorldState};

use super::script::{ScriptApi, ScriptFn, script};

/// An authored event: eligibility predicates plus a root script and
/// optional named branch scripts.
#[derive(Clone)]
pub struct AuthoredEvent {
    id: String,
    conditions: Predicate,
    unlocked: Option<Predicate>,
    locked: Option<Predicate>,
    execute: ScriptFn,
    branches: BTreeMap<String, ScriptFn>,
}

impl AuthoredEvent {
    /// Creates an event whose conditions always hold.
    #[must_use]
    pub fn new<F, Fut>(id: impl Into<String>, execute: F) -> Self
    where
        F: Fn(Arc<dyn ScriptApi>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScriptResult<()>> + Send + 'static,
    {
        Self {
            id: id.into(),
            conditions: Arc::new(|_: &WorldState| true),
            unlocked: None,
            locked: None,
            execute: script(execute),
            branches: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_conditions(
        mut self,
        conditions: impl Fn(&WorldState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.conditions = Arc::new(conditions);
        self
    }

    #[must_use]
    pub fn with_unlocked(
        mut self,
        unlocked: impl Fn(&WorldState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.unlocked = Some(Arc::new(unlocked));
        self
    }

    #[must_use]
    pub fn with_locked(
        mut self,
        locked: impl Fn(&WorldState) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.locked = Some(Arc::new(locked));
        self
    }

    /// Adds a branch script reachable through `ScriptRef::branch(id, name)`.
    #[must_use]
    pub fn with_branch<F, Fut>(mut self, name: impl Into<String>, execute: F) -> Self
    where
        F: Fn(Arc<dyn ScriptApi>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScriptResult<()>> + Send + 'static,
    {
        self.branches.insert(name.into(), script(execute));
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` if the event may start: its conditions hold, it is
    /// unlocked, and it is not locked.
    #[must_use]
    pub fn is_eligible(&self, state: &WorldState) -> bool {
        (self.conditions)(state)
            && self.unlocked.as_ref().is_none_or(|unlocked| unlocked(state))
            && !self.locked.as_ref().is_some_and(|locked| locked(state))
    }

    /// The root script, or the named branch.
    #[must_use]
    pub fn script(&self, branch: Option<&str>) -> Option<ScriptFn> {
        match branch {
            None => Some(Arc::clone(&self.execute)),
            Some(name) => self.branches.get(name).cloned(),
        }
    }

    /// Names of the event's branches.
    pub fn branches(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }
}

impl fmt::Debug for AuthoredEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthoredEvent")
            .field("id", &self.id)
            .field("branches", &self.branches.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> AuthoredEvent {
        AuthoredEvent::new("storm", |_api| async { ScriptResult::Ok(()) })
    }

    #[test]
    fn test_event_without_predicates_is_eligible() {
        assert!(event().is_eligible(&WorldState::default()));
    }

    #[test]
    fn test_locked_event_is_not_eligible() {
        // Arrange
        let event = event()
            .with_conditions(|s| s.is_at("harbor"))
            .with_locked(|s| s.is_flag_set("storm_seen"));
        let mut state = WorldState {
            location: Some("harbor".into()),
            ..WorldState::default()
        };

        // Act
        let before = event.is_eligible(&state);
        state.set_flag("storm_seen", true);

        // Assert
        assert!(before);
        assert!(!event.is_eligible(&state));
    }

    #[test]
    fn test_unlocked_predicate_must_hold() {
        let event = event().with_unlocked(|s| s.counter("day") >= 2);

        assert!(!event.is_eligible(&WorldState::default()));
    }

    #[test]
    fn test_script_resolves_root_and_branches() {
        let event = event().with_branch("shelter", |_api| async { ScriptResult::Ok(()) });

        assert!(event.script(None).is_some());
        assert!(event.script(Some("shelter")).is_some());
        assert!(event.script(Some("flee")).is_none());
        assert_eq!(event.branches().collect::<Vec<_>>(), vec!["shelter"]);
    }
}
