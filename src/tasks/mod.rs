//! Background tasks module
//!
//! This module contains background tasks that run alongside the server.

pub mod broadcast_pulse;

// Re-export main functions
pub use broadcast_pulse::broadcast_pulse_task;
