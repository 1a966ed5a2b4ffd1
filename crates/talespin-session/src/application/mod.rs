//! Application layer for the Session context.

pub mod engine;
pub mod scheduler;
mod script_api;
