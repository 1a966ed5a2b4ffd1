//! Talespin Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that every bounded
//! context depends on: the error taxonomy, the script interrupt signal, the
//! world state record, and the ports (clock, save repository, presenter)
//! the engine talks to. It contains no infrastructure code.

pub mod clock;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod presentation;
pub mod repository;
pub mod script;
pub mod sync;
pub mod world;
