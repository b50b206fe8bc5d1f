//! Command application against the countdown clock

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::state::{AppState, SubscriberId};
use super::{command::TimerCommand, gate::SenderCredentials};

/// Outcome of handling a control message, mostly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Applied to the clock and broadcast to all subscribers.
    Applied,
    /// Sender failed the authorization gate.
    Unauthorized,
    /// Sender exhausted its rate window; command silently dropped.
    RateLimited,
    /// Internal failure while checking or applying; command dropped.
    Failed,
}

/// Validate and apply one control command from an identified sender.
///
/// Commands are fire-and-forget: dropped ones (unauthorized, rate limited)
/// produce no reply and no broadcast. Accepted commands always broadcast
/// the resulting snapshot (via `update_clock`, under the clock lock), even
/// when the transition was a no-op, so every viewer converges on the
/// sender's view of the clock.
pub fn apply_command(
    state: &Arc<AppState>,
    sender: &SubscriberId,
    credentials: &SenderCredentials,
    command: TimerCommand,
) -> CommandOutcome {
    if !state.gate.is_authorized(credentials) {
        debug!("Dropping {} from unauthorized sender {}", command.name(), sender);
        return CommandOutcome::Unauthorized;
    }

    match state.charge_sender(sender) {
        Ok(true) => {}
        Ok(false) => {
            debug!("Rate limit hit, dropping {} from {}", command.name(), sender);
            return CommandOutcome::RateLimited;
        }
        Err(e) => {
            error!("Failed to check rate limit: {}", e);
            return CommandOutcome::Failed;
        }
    }

    let snapshot = match state.update_clock(|clock| match command {
        TimerCommand::Start { .. } => clock.start(),
        TimerCommand::Pause => clock.pause(),
        TimerCommand::Resume => clock.resume(),
        TimerCommand::Stop => clock.stop(),
    }) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to apply {}: {}", command.name(), e);
            return CommandOutcome::Failed;
        }
    };

    state.record_command(command.name());
    info!(
        "Applied {} from {}: remaining={}s running={} paused={}",
        command.name(),
        sender,
        snapshot.remaining_seconds,
        snapshot.is_running,
        snapshot.is_paused
    );

    CommandOutcome::Applied
}
