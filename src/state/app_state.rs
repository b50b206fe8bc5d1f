//! Shared application state

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::api::responses::TimeSync;
use crate::control::gate::ControlGate;
use super::{
    clock::{TimerClock, TimerSnapshot},
    registry::{SubscriberId, SubscriberRegistry},
};

/// Everything the handlers and background tasks share.
///
/// The clock mutex is the single write path for timer state: commands apply
/// one at a time under it, and snapshots are taken under it, so no observer
/// can see a half-applied transition.
pub struct AppState {
    /// The authoritative countdown clock.
    clock: Mutex<TimerClock>,
    /// Connected viewers and their rate windows.
    registry: Mutex<SubscriberRegistry>,
    /// Decides which senders may issue control commands.
    pub gate: Arc<dyn ControlGate>,
    /// Fan-out channel for time-sync messages; every WebSocket connection
    /// holds a receiver. Lagging receivers drop the oldest messages and
    /// catch up at the latest state.
    sync_tx: broadcast::Sender<TimeSync>,
    /// Whether the clock is actively counting down; drives the pulse task.
    ticking_tx: watch::Sender<bool>,
    /// Keep the receiver alive to prevent channel closure
    _ticking_rx: watch::Receiver<bool>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last accepted command tracking
    last_command: Mutex<Option<String>>,
    last_command_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the state with a stopped clock holding the full duration.
    pub fn new(port: u16, host: String, full_duration: Duration, gate: Arc<dyn ControlGate>) -> Self {
        let (sync_tx, _) = broadcast::channel(100);
        let (ticking_tx, ticking_rx) = watch::channel(false);

        Self {
            clock: Mutex::new(TimerClock::new(full_duration)),
            registry: Mutex::new(SubscriberRegistry::new()),
            gate,
            sync_tx,
            ticking_tx,
            _ticking_rx: ticking_rx,
            start_time: Instant::now(),
            port,
            host,
            last_command: Mutex::new(None),
            last_command_time: Mutex::new(None),
        }
    }

    /// Get a fresh snapshot of the countdown.
    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.clock
            .lock()
            .map(|clock| clock.snapshot())
            .map_err(|e| format!("Failed to lock clock: {}", e))
    }

    /// Apply a mutation to the clock, broadcast the resulting snapshot, and
    /// refresh the ticking watch that drives the broadcast pulse task.
    ///
    /// The watch update and the broadcast happen while the clock mutex is
    /// still held. Two senders mutating back to back therefore produce
    /// watch values and broadcasts in mutation order; releasing the lock
    /// first would let them interleave, leaving the pulse armed against a
    /// stopped clock.
    pub fn update_clock<F>(&self, mutate: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut TimerClock),
    {
        let mut clock = self.clock.lock()
            .map_err(|e| format!("Failed to lock clock: {}", e))?;

        mutate(&mut clock);
        let snapshot = clock.snapshot();
        self.ticking_tx.send_replace(clock.is_ticking());
        // A send error just means nobody is listening right now.
        let _ = self.sync_tx.send(TimeSync::from_snapshot(snapshot));
        Ok(snapshot)
    }

    /// Broadcast a fresh snapshot without mutating the clock, still under
    /// the clock lock so pulses cannot overtake a concurrent command's
    /// broadcast.
    pub fn publish_snapshot(&self) -> Result<TimerSnapshot, String> {
        let clock = self.clock.lock()
            .map_err(|e| format!("Failed to lock clock: {}", e))?;

        let snapshot = clock.snapshot();
        let _ = self.sync_tx.send(TimeSync::from_snapshot(snapshot));
        Ok(snapshot)
    }

    /// Subscribe to the time-sync fan-out.
    pub fn subscribe(&self) -> broadcast::Receiver<TimeSync> {
        self.sync_tx.subscribe()
    }

    /// Watch handle for the pulse task.
    pub fn ticking_rx(&self) -> watch::Receiver<bool> {
        self.ticking_tx.subscribe()
    }

    /// Register a new viewer connection.
    pub fn add_subscriber(&self) -> Result<SubscriberId, String> {
        let mut registry = self.registry.lock()
            .map_err(|e| format!("Failed to lock registry: {}", e))?;

        let id = registry.add();
        info!("Subscriber {} connected ({} total)", id, registry.count());
        Ok(id)
    }

    /// Drop a disconnected viewer.
    pub fn remove_subscriber(&self, id: &SubscriberId) -> Result<(), String> {
        let mut registry = self.registry.lock()
            .map_err(|e| format!("Failed to lock registry: {}", e))?;

        if let Some(subscriber) = registry.remove(id) {
            let session = Utc::now().signed_duration_since(subscriber.connected_at);
            info!("Subscriber {} disconnected after {}s ({} total)",
                  id, session.num_seconds(), registry.count());
        }
        Ok(())
    }

    /// Number of currently connected viewers.
    pub fn subscriber_count(&self) -> Result<usize, String> {
        self.registry.lock()
            .map(|registry| registry.count())
            .map_err(|e| format!("Failed to lock registry: {}", e))
    }

    /// Charge one command against a sender's rate window.
    pub fn charge_sender(&self, id: &SubscriberId) -> Result<bool, String> {
        self.registry.lock()
            .map(|mut registry| registry.try_charge(id))
            .map_err(|e| format!("Failed to lock registry: {}", e))
    }

    /// Record an accepted command for the status endpoint.
    pub fn record_command(&self, name: &str) {
        if let Ok(mut last) = self.last_command.lock() {
            *last = Some(name.to_string());
        }
        if let Ok(mut last_time) = self.last_command_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last accepted command information
    pub fn get_last_command(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_command = self.last_command.lock().ok().and_then(|c| c.clone());
        let last_command_time = self.last_command_time.lock().ok().and_then(|t| *t);
        (last_command, last_command_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::gate::AllowAll;

    fn state() -> AppState {
        AppState::new(3000, "0.0.0.0".to_string(), Duration::from_secs(60), Arc::new(AllowAll))
    }

    #[tokio::test(start_paused = true)]
    async fn update_clock_flips_the_ticking_watch() {
        let state = state();
        let mut rx = state.ticking_rx();
        assert!(!*rx.borrow());

        state.update_clock(|c| c.start()).expect("update");
        assert!(*rx.borrow_and_update());

        state.update_clock(|c| c.pause()).expect("update");
        assert!(!*rx.borrow_and_update());

        state.update_clock(|c| c.resume()).expect("update");
        assert!(*rx.borrow_and_update());

        state.update_clock(|c| c.stop()).expect("update");
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn publish_snapshot_reaches_every_subscriber() {
        let state = state();
        let mut rx_a = state.subscribe();
        let mut rx_b = state.subscribe();

        state.publish_snapshot().expect("publish");

        let got_a = rx_a.recv().await.expect("recv");
        let got_b = rx_b.recv().await.expect("recv");
        assert_eq!(got_a.time, 60);
        assert_eq!(got_a, got_b);
    }

    #[tokio::test]
    async fn publish_snapshot_without_subscribers_is_fine() {
        let state = state();
        state.publish_snapshot().expect("publish");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_keep_watch_and_broadcasts_in_mutation_order() {
        let state = Arc::new(state());
        let mut rx = state.subscribe();
        let ticking_rx = state.ticking_rx();

        // Interleave START/STOP from several senders. Each task ends on
        // STOP, so whichever mutation lands last leaves the clock idle;
        // the watch and the final broadcast must agree with it.
        let mut handles = Vec::new();
        for _ in 0..4 {
            let state = Arc::clone(&state);
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    state.update_clock(|c| c.start()).expect("update");
                    state.update_clock(|c| c.stop()).expect("update");
                }
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        let snapshot = state.snapshot().expect("snapshot");
        assert!(!snapshot.is_running);
        assert!(!*ticking_rx.borrow());

        let mut last = None;
        while let Ok(sync) = rx.try_recv() {
            last = Some(sync);
        }
        let last = last.expect("broadcast");
        assert!(!last.is_running);
        assert_eq!(last.time, snapshot.remaining_seconds);
    }
}
