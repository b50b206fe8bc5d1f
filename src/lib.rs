//! Countdown Relay - A synchronized countdown timer server
//!
//! This library provides an authoritative countdown clock, a command
//! processor with per-sender rate limiting, and a WebSocket fan-out that
//! keeps every connected viewer in sync.

pub mod config;
pub mod state;
pub mod control;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
