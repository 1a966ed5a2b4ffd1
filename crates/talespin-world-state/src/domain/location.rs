//! Locations, the links between them, and the linking strategy.

use std::collections::{BTreeMap, BTreeSet};

use talespin_core::error::DomainError;

use super::action::Action;

/// Prefix of the generated travel action ids.
pub const TRAVEL_ACTION_PREFIX: &str = "travel:";

/// A place the player can be, with its own actions.
#[derive(Debug, Clone)]
pub struct Location {
    id: String,
    name: String,
    actions: Vec<Action>,
    links: BTreeSet<String>,
}

impl Location {
    /// Creates a location with no actions and no links.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            actions: Vec::new(),
            links: BTreeSet::new(),
        }
    }

    /// Adds an action available only at this location.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
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

    /// Ids of the locations reachable from here.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }
}

/// All known locations, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: BTreeMap<String, Location>,
}

impl LocationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a location.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the id is blank or already taken.
    pub fn insert(&mut self, location: Location) -> Result<(), DomainError> {
        if location.id.trim().is_empty() {
            return Err(DomainError::Validation(
                "location id must not be empty".into(),
            ));
        }
        if self.locations.contains_key(&location.id) {
            return Err(DomainError::Validation(format!(
                "duplicate location id: {}",
                location.id
            )));
        }
        self.locations.insert(location.id.clone(), location);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Connects two locations in both directions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Lookup` if either id is unknown.
    pub fn link(&mut self, a: &str, b: &str) -> Result<(), DomainError> {
        for id in [a, b] {
            if !self.contains(id) {
                return Err(DomainError::Lookup(format!("unknown location: {id}")));
            }
        }
        if let Some(location) = self.locations.get_mut(a) {
            location.links.insert(b.to_owned());
        }
        if let Some(location) = self.locations.get_mut(b) {
            location.links.insert(a.to_owned());
        }
        Ok(())
    }

    /// Actions available at `id`: its own actions followed by one travel
    /// action per linked location. Unknown ids have none.
    #[must_use]
    pub fn local_actions(&self, id: &str) -> Vec<Action> {
        let Some(location) = self.locations.get(id) else {
            return Vec::new();
        };

        let travel = location.links().filter_map(|dest| {
            let destination = self.locations.get(dest)?;
            let target = destination.id.clone();
            Some(Action::new(
                format!("{TRAVEL_ACTION_PREFIX}{target}"),
                format!("Go to {}", destination.name),
                move |state| state.location = Some(target.clone()),
            ))
        });

        location.actions.iter().cloned().chain(travel).collect()
    }
}

/// Content-specific strategy that wires up the links between locations.
///
/// Run once when the engine is assembled, after every location is
/// registered.
pub trait LocationLinker: Send + Sync {
    /// Adds links to `registry`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a link refers to an unknown location.
    fn init_links(&self, registry: &mut LocationRegistry) -> Result<(), DomainError>;
}

/// A linker that connects a fixed list of location pairs.
#[derive(Debug, Clone, Default)]
pub struct StaticLinks {
    pairs: Vec<(String, String)>,
}

impl StaticLinks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bidirectional link between `a` and `b`.
    #[must_use]
    pub fn with(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.pairs.push((a.into(), b.into()));
        self
    }
}

impl LocationLinker for StaticLinks {
    fn init_links(&self, registry: &mut LocationRegistry) -> Result<(), DomainError> {
        for (a, b) in &self.pairs {
            registry.link(a, b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use talespin_core::world::WorldState;

    use super::*;

    fn registry() -> LocationRegistry {
        let mut registry = LocationRegistry::new();
        registry
            .insert(
                Location::new("harbor", "The Harbor")
                    .with_action(Action::new("fish", "Fish", |s| {
                        s.increment("fish", 1);
                    })),
            )
            .unwrap();
        registry
            .insert(Location::new("market", "The Market"))
            .unwrap();
        registry
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut registry = registry();

        let result = registry.insert(Location::new("harbor", "Another Harbor"));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_insert_rejects_blank_ids() {
        let mut registry = registry();

        let result = registry.insert(Location::new(" ", "Nowhere"));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_link_is_bidirectional() {
        // Arrange
        let mut registry = registry();

        // Act
        registry.link("harbor", "market").unwrap();

        // Assert
        assert_eq!(registry.get("harbor").unwrap().links().collect::<Vec<_>>(), vec!["market"]);
        assert_eq!(registry.get("market").unwrap().links().collect::<Vec<_>>(), vec!["harbor"]);
    }

    #[test]
    fn test_link_to_unknown_location_fails_with_lookup() {
        let mut registry = registry();

        let result = registry.link("harbor", "lighthouse");

        match result {
            Err(DomainError::Lookup(msg)) => assert!(msg.contains("lighthouse")),
            other => panic!("expected Lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_local_actions_include_generated_travel() {
        // Arrange
        let mut registry = registry();
        registry.link("harbor", "market").unwrap();
        let mut state = WorldState::default();

        // Act
        let actions = registry.local_actions("harbor");
        let travel = actions.iter().find(|a| a.id() == "travel:market").unwrap();
        travel.execute(&mut state);

        // Assert
        let ids: Vec<_> = actions.iter().map(Action::id).collect();
        assert_eq!(ids, vec!["fish", "travel:market"]);
        assert_eq!(travel.name(), "Go to The Market");
        assert!(state.is_at("market"));
    }

    #[test]
    fn test_static_links_wire_every_pair() {
        let mut registry = registry();
        let linker = StaticLinks::new().with("harbor", "market");

        linker.init_links(&mut registry).unwrap();

        assert!(registry.get("market").unwrap().links().any(|l| l == "harbor"));
    }
}
