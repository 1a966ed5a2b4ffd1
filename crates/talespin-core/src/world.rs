//! The mutable world record scripts and actions operate on.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sync::lock;

/// Minutes in one in-game day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Predicate evaluated against the world (event conditions, action locks).
pub type Predicate = Arc<dyn Fn(&WorldState) -> bool + Send + Sync>;

/// In-game calendar position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Days elapsed since the start of the game.
    pub day: u32,
    /// Minute of the current day, `0..MINUTES_PER_DAY`.
    pub minute: u32,
}

impl GameClock {
    /// Advances the clock, rolling minutes over into days. Saturates at the
    /// last representable day.
    pub fn advance(&mut self, minutes: u32) {
        let total = self.minute.saturating_add(minutes);
        self.day = self.day.saturating_add(total / MINUTES_PER_DAY);
        self.minute = total % MINUTES_PER_DAY;
    }
}

/// The game's world state: player data, flags, location, clock and NPCs.
///
/// Maps are ordered so snapshots compare and serialize deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Free-form player record (name, stats, inventory...).
    #[serde(default)]
    pub player: BTreeMap<String, Value>,
    /// Story flags.
    #[serde(default)]
    pub flags: BTreeMap<String, Value>,
    /// Id of the location the player is at.
    #[serde(default)]
    pub location: Option<String>,
    /// In-game time.
    #[serde(default)]
    pub clock: GameClock,
    /// Per-NPC records keyed by NPC id.
    #[serde(default)]
    pub npcs: BTreeMap<String, Value>,
}

impl WorldState {
    /// Returns the value of a flag.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<&Value> {
        self.flags.get(key)
    }

    /// Returns `true` if the flag is set to boolean `true`.
    #[must_use]
    pub fn is_flag_set(&self, key: &str) -> bool {
        matches!(self.flags.get(key), Some(Value::Bool(true)))
    }

    /// Reads a flag as an integer, defaulting to `0`.
    #[must_use]
    pub fn counter(&self, key: &str) -> i64 {
        self.flags.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Sets a flag.
    pub fn set_flag(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.flags.insert(key.into(), value.into());
    }

    /// Adds `delta` to an integer flag and returns the new value, saturating
    /// at the `i64` bounds.
    pub fn increment(&mut self, key: &str, delta: i64) -> i64 {
        let next = self.counter(key).saturating_add(delta);
        self.flags.insert(key.to_owned(), Value::from(next));
        next
    }

    /// Returns `true` if the player is at `location`.
    #[must_use]
    pub fn is_at(&self, location: &str) -> bool {
        self.location.as_deref() == Some(location)
    }
}

/// Shared handle to the engine-owned world.
///
/// Closures passed to [`StateHandle::read`] and [`StateHandle::update`] run
/// while the lock is held; they must not suspend.
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Arc<Mutex<WorldState>>,
}

impl StateHandle {
    /// Creates a handle owning `state`.
    #[must_use]
    pub fn new(state: WorldState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Runs `f` with shared access to the world.
    pub fn read<R>(&self, f: impl FnOnce(&WorldState) -> R) -> R {
        f(&*lock(&self.inner))
    }

    /// Runs `f` with exclusive access to the world.
    pub fn update<R>(&self, f: impl FnOnce(&mut WorldState) -> R) -> R {
        f(&mut *lock(&self.inner))
    }

    /// Returns a deep copy of the current world.
    #[must_use]
    pub fn snapshot(&self) -> WorldState {
        lock(&self.inner).clone()
    }

    /// Replaces the world wholesale.
    pub fn replace(&self, state: WorldState) {
        *lock(&self.inner) = state;
    }
}
