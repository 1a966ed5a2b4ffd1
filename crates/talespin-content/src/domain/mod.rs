//! Domain layer for the Content context.

pub mod event;
pub mod pack;
pub mod script;
