//! Talespin — Session bounded context.
//!
//! Responsible for running authored scripts one at a time, counting their
//! suspension steps, resuming them mid-script by replay, and saving and
//! loading whole games. [`application::engine::Engine`] is the entry point
//! hosts drive.

pub mod application;
pub mod domain;
