//! Application layer for the Narrative Navigation context.

pub mod navigation;
