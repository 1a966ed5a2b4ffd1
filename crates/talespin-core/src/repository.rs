//! Save repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Key of one save slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveSlot {
    /// Project the save belongs to.
    pub project_id: String,
    /// Slot number within the project.
    pub slot: u32,
}

impl SaveSlot {
    /// Creates a slot key.
    #[must_use]
    pub fn new(project_id: impl Into<String>, slot: u32) -> Self {
        Self {
            project_id: project_id.into(),
            slot,
        }
    }
}

/// Stored representation of a save record.
///
/// Payloads are kept as JSON so storage stays independent of the session
/// context's typed snapshot structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSave {
    /// Player-facing save name.
    pub name: String,
    /// When the save was made.
    pub timestamp: DateTime<Utc>,
    /// Deep copy of the world state.
    pub game_state: serde_json::Value,
    /// Engine snapshot, including the bookmark.
    pub engine_state: serde_json::Value,
    /// Undo/redo buffer contents.
    pub history_state: serde_json::Value,
}

/// Listing entry for an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    /// Slot number.
    pub slot: u32,
    /// Player-facing save name.
    pub name: String,
    /// When the save was made.
    pub timestamp: DateTime<Utc>,
}

/// Repository trait for save slots keyed by `(project_id, slot)`.
#[async_trait]
pub trait SaveRepository: Send + Sync {
    /// Loads the save at `slot`, or `None` if the slot is empty.
    async fn load_save(&self, slot: &SaveSlot) -> Result<Option<StoredSave>, DomainError>;

    /// Writes `save` to `slot`, replacing any previous content.
    async fn store_save(&self, slot: &SaveSlot, save: &StoredSave) -> Result<(), DomainError>;

    /// Lists occupied slots of a project, ordered by slot number.
    async fn list_saves(&self, project_id: &str) -> Result<Vec<SaveSummary>, DomainError>;

    /// Removes the save at `slot`. Removing an empty slot is not an error.
    async fn delete_save(&self, slot: &SaveSlot) -> Result<(), DomainError>;
}
