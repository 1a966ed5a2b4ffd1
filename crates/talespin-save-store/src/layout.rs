//! On-disk layout of save slots.
//!
//! ```text
//! <root>/<project_id>/slot-<n>.json
//! ```

use std::path::{Path, PathBuf};

use talespin_core::error::DomainError;

const SLOT_PREFIX: &str = "slot-";
const SLOT_EXTENSION: &str = "json";

/// Checks that `project_id` is usable as a single directory name.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the id is empty or contains anything
/// besides ASCII letters, digits, `-` and `_`.
pub fn validate_project_id(project_id: &str) -> Result<(), DomainError> {
    let valid = !project_id.is_empty()
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "invalid project id: {project_id:?}"
        )))
    }
}

#[must_use]
pub fn project_dir(root: &Path, project_id: &str) -> PathBuf {
    root.join(project_id)
}

#[must_use]
pub fn slot_file_name(slot: u32) -> String {
    format!("{SLOT_PREFIX}{slot}.{SLOT_EXTENSION}")
}

/// Parses a slot number back out of a file name written by
/// [`slot_file_name`]. Anything else yields `None`.
#[must_use]
pub fn parse_slot_file_name(name: &str) -> Option<u32> {
    name.strip_prefix(SLOT_PREFIX)?
        .strip_suffix(SLOT_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_file_name_round_trips() {
        assert_eq!(slot_file_name(7), "slot-7.json");
        assert_eq!(parse_slot_file_name("slot-7.json"), Some(7));
    }

    #[test]
    fn test_foreign_file_names_are_ignored() {
        assert_eq!(parse_slot_file_name("slot-7.json.tmp"), None);
        assert_eq!(parse_slot_file_name("slot-x.json"), None);
        assert_eq!(parse_slot_file_name("notes.txt"), None);
        assert_eq!(parse_slot_file_name("slot-.json"), None);
    }

    #[test]
    fn test_project_id_validation() {
        assert!(validate_project_id("my-game_2").is_ok());
        assert!(matches!(validate_project_id(""), Err(DomainError::Validation(_))));
        assert!(matches!(
            validate_project_id("../escape"),
            Err(DomainError::Validation(_))
        ));
    }
}
