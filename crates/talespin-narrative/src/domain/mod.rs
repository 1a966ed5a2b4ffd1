//! Domain layer for the Narrative Navigation context.

pub mod gate;
pub mod history;
