//! Route modules organized by bounded context.

pub mod health;
pub mod narrative;
pub mod session;
pub mod world_state;
