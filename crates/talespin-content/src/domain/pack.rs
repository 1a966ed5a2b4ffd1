//! Content pack: everything one game brings to the engine.

use std::fmt;

use talespin_core::error::DomainError;
use talespin_core::world::WorldState;
use talespin_world_state::domain::action::Action;
use talespin_world_state::domain::location::{Location, LocationLinker, LocationRegistry};

use super::event::AuthoredEvent;
use crate::application::registry::EventRegistry;

/// Events, actions, locations and the location-linking strategy of one
/// game, composed at startup.
#[derive(Default)]
pub struct ContentPack {
    /// Authored events.
    pub events: EventRegistry,
    /// Actions available everywhere.
    pub global_actions: Vec<Action>,
    /// Known locations.
    pub locations: LocationRegistry,
    /// Wires up links between `locations`.
    pub linker: Option<Box<dyn LocationLinker>>,
    /// World a new game starts from.
    pub initial_state: WorldState,
}

impl ContentPack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on a duplicate or blank id.
    pub fn with_event(mut self, event: AuthoredEvent) -> Result<Self, DomainError> {
        self.events.register(event)?;
        Ok(self)
    }

    /// Adds a global action.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.global_actions.push(action);
        self
    }

    /// Adds a location.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on a duplicate or blank id.
    pub fn with_location(mut self, location: Location) -> Result<Self, DomainError> {
        self.locations.insert(location)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_linker(mut self, linker: impl LocationLinker + 'static) -> Self {
        self.linker = Some(Box::new(linker));
        self
    }

    #[must_use]
    pub fn with_initial_state(mut self, state: WorldState) -> Self {
        self.initial_state = state;
        self
    }
}

impl fmt::Debug for ContentPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentPack")
            .field("events", &self.events)
            .field("global_actions", &self.global_actions)
            .field("locations", &self.locations)
            .field("has_linker", &self.linker.is_some())
            .finish_non_exhaustive()
    }
}
