//! Control command module
//!
//! Parsing, authorization, and application of timer control commands.

pub mod command;
pub mod gate;
pub mod processor;

// Re-export main types
pub use command::TimerCommand;
pub use gate::{AllowAll, ControlGate, SenderCredentials, SharedKey};
pub use processor::{apply_command, CommandOutcome};
