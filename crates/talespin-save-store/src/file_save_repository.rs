//! JSON file implementation of the `SaveRepository` trait.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use talespin_core::error::DomainError;
use talespin_core::repository::{SaveRepository, SaveSlot, SaveSummary, StoredSave};

use crate::layout::{parse_slot_file_name, project_dir, slot_file_name, validate_project_id};

/// Stores each slot as a pretty-printed JSON file under a root directory.
///
/// Writes go to a temporary file that is then renamed over the slot file, so
/// a crash mid-write never leaves a truncated save behind.
#[derive(Debug, Clone)]
pub struct FileSaveRepository {
    root: PathBuf,
}

impl FileSaveRepository {
    /// Creates a repository rooted at `root`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &SaveSlot) -> Result<PathBuf, DomainError> {
        validate_project_id(&slot.project_id)?;
        Ok(project_dir(&self.root, &slot.project_id).join(slot_file_name(slot.slot)))
    }
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("{action} {} failed: {e}", path.display()))
}

async fn read_save(path: &Path) -> Result<Option<StoredSave>, DomainError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error("reading", path, &e)),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        DomainError::Infrastructure(format!(
            "save deserialization of {} failed: {e}",
            path.display()
        ))
    })
}

#[async_trait]
impl SaveRepository for FileSaveRepository {
    async fn load_save(&self, slot: &SaveSlot) -> Result<Option<StoredSave>, DomainError> {
        let path = self.slot_path(slot)?;
        read_save(&path).await
    }

    async fn store_save(&self, slot: &SaveSlot, save: &StoredSave) -> Result<(), DomainError> {
        let path = self.slot_path(slot)?;
        let json = serde_json::to_vec_pretty(save)
            .map_err(|e| DomainError::Infrastructure(format!("save serialization failed: {e}")))?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error("creating", dir, &e))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| io_error("writing", &tmp, &e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error("renaming", &tmp, &e))?;

        debug!(path = %path.display(), "save written");
        Ok(())
    }

    async fn list_saves(&self, project_id: &str) -> Result<Vec<SaveSummary>, DomainError> {
        validate_project_id(project_id)?;
        let dir = project_dir(&self.root, project_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("listing", &dir, &e)),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("listing", &dir, &e))?
        {
            let file_name = entry.file_name();
            let Some(slot) = file_name.to_str().and_then(parse_slot_file_name) else {
                continue;
            };
            match read_save(&entry.path()).await {
                Ok(Some(save)) => summaries.push(SaveSummary {
                    slot,
                    name: save.name,
                    timestamp: save.timestamp,
                }),
                Ok(None) => {}
                Err(error) => warn!(slot, %error, "skipping unreadable save"),
            }
        }

        summaries.sort_by_key(|summary| summary.slot);
        Ok(summaries)
    }

    async fn delete_save(&self, slot: &SaveSlot) -> Result<(), DomainError> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "save deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("deleting", &path, &e)),
        }
    }
}
