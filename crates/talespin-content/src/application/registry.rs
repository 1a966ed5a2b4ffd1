//! Event registry: lookup and eligibility queries over authored events.

use std::collections::HashMap;

use talespin_core::error::DomainError;
use talespin_core::script::ScriptRef;
use talespin_core::world::WorldState;

use crate::domain::event::AuthoredEvent;
use crate::domain::script::ScriptFn;

/// Authored events in registration order.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: Vec<AuthoredEvent>,
    index: HashMap<String, usize>,
}

impl EventRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the id is blank or already
    /// registered.
    pub fn register(&mut self, event: AuthoredEvent) -> Result<(), DomainError> {
        if event.id().trim().is_empty() {
            return Err(DomainError::Validation("event id must not be empty".into()));
        }
        if self.index.contains_key(event.id()) {
            return Err(DomainError::Validation(format!(
                "duplicate event id: {}",
                event.id()
            )));
        }
        self.index.insert(event.id().to_owned(), self.events.len());
        self.events.push(event);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AuthoredEvent> {
        self.index.get(id).map(|&i| &self.events[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Finds the script `target` refers to.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Lookup` if the event or branch is unknown.
    pub fn resolve(&self, target: &ScriptRef) -> Result<ScriptFn, DomainError> {
        self.get(&target.event_id)
            .and_then(|event| event.script(target.branch.as_deref()))
            .ok_or_else(|| DomainError::Lookup(format!("unknown script: {target}")))
    }

    /// The first registered event eligible to start in `state`.
    #[must_use]
    pub fn first_eligible(&self, state: &WorldState) -> Option<&AuthoredEvent> {
        self.events.iter().find(|event| event.is_eligible(state))
    }
}
