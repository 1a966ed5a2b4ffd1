//! Application layer for the World State context.

pub mod action_resolver;
