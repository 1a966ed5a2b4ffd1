//! Talespin — Narrative Navigation bounded context.
//!
//! Responsible for the suspension gates scripts pause on, the bounded
//! undo/redo history of resolved narrative actions, and reconciling the
//! player's forward/back/skip intents against both.

pub mod application;
pub mod domain;
