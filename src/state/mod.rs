//! State management module
//!
//! This module contains the authoritative countdown clock, the subscriber
//! registry, and the shared application state tying them together.

pub mod clock;
pub mod app_state;
pub mod registry;

// Re-export main types
pub use clock::{TimerClock, TimerSnapshot};
pub use app_state::AppState;
pub use registry::{SubscriberId, SubscriberRegistry};
