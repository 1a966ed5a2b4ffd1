//! Talespin — Content bounded context.
//!
//! Defines what authored content looks like to the engine: events with
//! eligibility predicates and async scripts, the API those scripts are
//! handed, and the pack that bundles events, actions and locations for one
//! game.

pub mod application;
pub mod domain;
