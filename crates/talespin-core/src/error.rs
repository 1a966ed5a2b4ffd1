//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every fallible engine operation (save, load, action execution, script
/// launch) reports one of these at its boundary. Script interrupts are not
/// errors and live in [`crate::interrupt`].
#[derive(Debug, Error)]
pub enum DomainError {
    /// An action, event, branch or location id did not resolve.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// The operation is not allowed in the current state (e.g. an action
    /// that is no longer unlocked).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// No save data exists at the requested slot.
    #[error("no save data for project {project_id} at slot {slot}")]
    NotFound {
        /// The project the slot belongs to.
        project_id: String,
        /// The requested slot.
        slot: u32,
    },

    /// A validation error in domain logic or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
