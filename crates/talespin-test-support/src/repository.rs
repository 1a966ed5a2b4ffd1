//! Test repositories — mock `SaveRepository` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use talespin_core::error::DomainError;
use talespin_core::repository::{SaveRepository, SaveSlot, SaveSummary, StoredSave};

/// A save repository that keeps records in memory and records every slot it
/// was asked to store.
#[derive(Debug, Default)]
pub struct InMemorySaveRepository {
    saves: Mutex<BTreeMap<(String, u32), StoredSave>>,
    stored: Mutex<Vec<SaveSlot>>,
}

impl InMemorySaveRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot directly, bypassing `store_save` recording.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert(&self, slot: &SaveSlot, save: StoredSave) {
        self.saves
            .lock()
            .unwrap()
            .insert((slot.project_id.clone(), slot.slot), save);
    }

    /// Returns a copy of the save at `slot`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get(&self, slot: &SaveSlot) -> Option<StoredSave> {
        self.saves
            .lock()
            .unwrap()
            .get(&(slot.project_id.clone(), slot.slot))
            .cloned()
    }

    /// Returns every slot passed to `store_save`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored_slots(&self) -> Vec<SaveSlot> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl SaveRepository for InMemorySaveRepository {
    async fn load_save(&self, slot: &SaveSlot) -> Result<Option<StoredSave>, DomainError> {
        Ok(self.get(slot))
    }

    async fn store_save(&self, slot: &SaveSlot, save: &StoredSave) -> Result<(), DomainError> {
        self.insert(slot, save.clone());
        self.stored.lock().unwrap().push(slot.clone());
        Ok(())
    }

    async fn list_saves(&self, project_id: &str) -> Result<Vec<SaveSummary>, DomainError> {
        Ok(self
            .saves
            .lock()
            .unwrap()
            .iter()
            .filter(|((project, _), _)| project == project_id)
            .map(|((_, slot), save)| SaveSummary {
                slot: *slot,
                name: save.name.clone(),
                timestamp: save.timestamp,
            })
            .collect())
    }

    async fn delete_save(&self, slot: &SaveSlot) -> Result<(), DomainError> {
        self.saves
            .lock()
            .unwrap()
            .remove(&(slot.project_id.clone(), slot.slot));
        Ok(())
    }
}

/// A save repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingSaveRepository;

#[async_trait]
impl SaveRepository for FailingSaveRepository {
    async fn load_save(&self, _slot: &SaveSlot) -> Result<Option<StoredSave>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn store_save(&self, _slot: &SaveSlot, _save: &StoredSave) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn list_saves(&self, _project_id: &str) -> Result<Vec<SaveSummary>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn delete_save(&self, _slot: &SaveSlot) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
