//! The control-flow signal used to abandon an in-flight script.
//!
//! An `Interrupt` is the only signal allowed to unwind through authored
//! script code. Scripts propagate it with `?`; only the script dispatch
//! boundary in the session context inspects it.

use thiserror::Error;

use crate::script::ScriptRef;

/// Why a suspended script was told to stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Interrupt {
    /// A navigation request (back, redo, new game, load) cancelled the
    /// pending suspension.
    #[error("script interrupted by navigation")]
    Navigation,

    /// The script requested a forced transition to another script.
    #[error("script interrupted by jump to {0}")]
    Jump(ScriptRef),
}

/// Result type returned by every suspension operation exposed to scripts.
pub type ScriptResult<T> = Result<T, Interrupt>;

/// Tagged outcome of running a script to its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The script body returned normally.
    Completed,
    /// The script stopped because an interrupt reached its top level.
    Interrupted(Interrupt),
}
