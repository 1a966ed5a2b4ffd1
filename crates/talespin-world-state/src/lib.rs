//! Talespin — World State bounded context.
//!
//! Responsible for the player actions that mutate the world outside of
//! scripts: global actions, per-location actions, travel between linked
//! locations, and working out which of them are currently accessible.

pub mod application;
pub mod domain;
