//! Domain layer for the World State context.

pub mod action;
pub mod location;
