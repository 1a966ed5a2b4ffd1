//! Shared test mocks and utilities for the Talespin narrative runtime.

mod clock;
mod presenter;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use presenter::{ChannelPresenter, PresentationReceiver};
pub use repository::{FailingSaveRepository, InMemorySaveRepository};
