//! Engine snapshot and the typed save record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talespin_core::error::DomainError;
use talespin_core::repository::StoredSave;
use talespin_core::script::Bookmark;
use talespin_core::world::WorldState;
use talespin_narrative::domain::history::HistoryData;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineStatus {
    /// No game in progress.
    #[default]
    Menu,
    /// A save is being replayed up to its bookmark.
    Loading,
    /// A game is in progress.
    Running,
}

/// Engine-owned presentation and position state, persisted in saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    /// Lifecycle state.
    pub state: EngineStatus,
    /// Position in the running script. In a saved snapshot this is where
    /// loading resumes; on a live engine it is only meaningful while
    /// `Loading`.
    #[serde(flatten)]
    pub bookmark: Bookmark,
    /// Current background image.
    #[serde(default)]
    pub background: Option<String>,
    /// Current foreground overlay.
    #[serde(default)]
    pub foreground: Option<String>,
}

/// One save slot's content.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub game_state: WorldState,
    pub engine_state: EngineSnapshot,
    pub history_state: HistoryData,
}

impl SaveRecord {
    /// Converts to the repository's storage representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a payload fails to serialize.
    pub fn to_stored(&self) -> Result<StoredSave, DomainError> {
        Ok(StoredSave {
            name: self.name.clone(),
            timestamp: self.timestamp,
            game_state: encode("game state", &self.game_state)?,
            engine_state: encode("engine state", &self.engine_state)?,
            history_state: encode("history state", &self.history_state)?,
        })
    }

    /// Decodes a stored save.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a payload is malformed.
    pub fn from_stored(stored: StoredSave) -> Result<Self, DomainError> {
        Ok(Self {
            name: stored.name,
            timestamp: stored.timestamp,
            game_state: decode("game state", stored.game_state)?,
            engine_state: decode("engine state", stored.engine_state)?,
            history_state: decode("history state", stored.history_state)?,
        })
    }
}

fn encode<T: Serialize>(what: &str, value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::Infrastructure(format!("{what} serialization failed: {e}")))
}

fn decode<T: for<'de> Deserialize<'de>>(
    what: &str,
    value: serde_json::Value,
) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Infrastructure(format!("{what} deserialization failed: {e}")))
}
