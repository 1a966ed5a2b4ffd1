//! Domain layer for the Session context.

pub mod snapshot;
