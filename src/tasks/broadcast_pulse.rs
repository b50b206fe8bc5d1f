//! Periodic time-sync broadcast task

use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Cadence of the periodic broadcast while the clock is counting down.
pub const PULSE_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that pushes the current snapshot to all subscribers once
/// per second while the clock is actively counting down.
///
/// The interval is armed when the ticking watch goes true and disarmed when
/// it goes false, so STOP and PAUSE leave no recurring timer behind and at
/// most one pulse interval exists at any time. Command-triggered broadcasts
/// happen separately in the command processor; this task only covers the
/// passage of time.
pub async fn broadcast_pulse_task(state: Arc<AppState>) {
    info!("Starting broadcast pulse task");

    let mut ticking_rx = state.ticking_rx();

    loop {
        // Wait for the clock to start counting down.
        while !*ticking_rx.borrow_and_update() {
            if ticking_rx.changed().await.is_err() {
                debug!("Ticking watch closed, pulse task exiting");
                return;
            }
        }

        let mut interval = tokio::time::interval(PULSE_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the command that started
        // the clock already broadcast this instant, so swallow it.
        interval.tick().await;

        loop {
            tokio::select! {
                // Pulse - push the current remaining time
                _ = interval.tick() => {
                    match state.publish_snapshot() {
                        Ok(snapshot) => {
                            debug!("Pulse: remaining={}s paused={}",
                                   snapshot.remaining_seconds, snapshot.is_paused);
                        }
                        Err(e) => error!("Failed to publish pulse: {}", e),
                    }
                }

                // Clock phase changed - disarm if no longer ticking
                changed = ticking_rx.changed() => {
                    if changed.is_err() {
                        debug!("Ticking watch closed, pulse task exiting");
                        return;
                    }
                    if !*ticking_rx.borrow_and_update() {
                        debug!("Clock stopped or paused, disarming pulse interval");
                        break;
                    }
                    // Still ticking (a re-based START); keep the interval.
                }
            }
        }
    }
}
