//! Connected subscriber tracking and per-sender command throttling

use std::collections::HashMap;
use std::time::Duration;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

/// Commands allowed per rate window, per sender.
pub const RATE_LIMIT_MAX_COMMANDS: u32 = 5;
/// Length of the rate window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(5);

/// Opaque id for a connected viewer.
pub type SubscriberId = Uuid;

/// Per-connection bookkeeping: when it joined and how many control commands
/// it has issued in the current rate window.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub connected_at: DateTime<Utc>,
    window_start: Instant,
    window_count: u32,
}

impl Subscriber {
    fn new() -> Self {
        Self {
            connected_at: Utc::now(),
            window_start: Instant::now(),
            window_count: 0,
        }
    }

    /// Charge one command against this sender's window. Returns false when
    /// the window budget is exhausted; the window resets once it has fully
    /// elapsed.
    fn try_charge(&mut self) -> bool {
        let now = Instant::now();
        if now.saturating_duration_since(self.window_start) > RATE_LIMIT_WINDOW {
            self.window_start = now;
            self.window_count = 0;
        }
        if self.window_count >= RATE_LIMIT_MAX_COMMANDS {
            return false;
        }
        self.window_count += 1;
        true
    }
}

/// Set of currently connected subscribers.
///
/// Purely diagnostic aside from rate limiting: the broadcast channel does
/// its own delivery, so dropping an entry here never affects other viewers.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<SubscriberId, Subscriber>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and hand back its id.
    pub fn add(&mut self) -> SubscriberId {
        let id = Uuid::new_v4();
        self.subscribers.insert(id, Subscriber::new());
        id
    }

    /// Remove a disconnected subscriber, handing back its record so the
    /// caller can log the session. Unknown ids yield `None`.
    pub fn remove(&mut self, id: &SubscriberId) -> Option<Subscriber> {
        self.subscribers.remove(id)
    }

    /// Number of currently connected subscribers.
    pub fn count(&self) -> usize {
        self.subscribers.len()
    }

    /// Charge one command against the sender's rate window. Unknown senders
    /// (already disconnected) are refused outright.
    pub fn try_charge(&mut self, id: &SubscriberId) -> bool {
        match self.subscribers.get_mut(id) {
            Some(sub) => sub.try_charge(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[test]
    fn add_and_remove_track_count() {
        let mut reg = SubscriberRegistry::new();
        let a = reg.add();
        let b = reg.add();
        assert_eq!(reg.count(), 2);

        let removed = reg.remove(&a);
        assert!(removed.is_some());
        assert!(removed.map(|s| s.connected_at <= Utc::now()).unwrap_or(false));
        assert_eq!(reg.count(), 1);

        // Removing twice is harmless.
        assert!(reg.remove(&a).is_none());
        assert_eq!(reg.count(), 1);
        reg.remove(&b);
        assert_eq!(reg.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_command_in_a_window_is_refused() {
        let mut reg = SubscriberRegistry::new();
        let id = reg.add();
        for _ in 0..RATE_LIMIT_MAX_COMMANDS {
            assert!(reg.try_charge(&id));
        }
        assert!(!reg.try_charge(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_it_elapses() {
        let mut reg = SubscriberRegistry::new();
        let id = reg.add();
        for _ in 0..RATE_LIMIT_MAX_COMMANDS {
            assert!(reg.try_charge(&id));
        }
        assert!(!reg.try_charge(&id));

        advance(RATE_LIMIT_WINDOW + Duration::from_millis(10)).await;
        assert!(reg.try_charge(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn windows_are_tracked_per_sender() {
        let mut reg = SubscriberRegistry::new();
        let a = reg.add();
        let b = reg.add();
        for _ in 0..RATE_LIMIT_MAX_COMMANDS {
            assert!(reg.try_charge(&a));
        }
        assert!(!reg.try_charge(&a));
        assert!(reg.try_charge(&b));
    }

    #[test]
    fn unknown_sender_is_refused() {
        let mut reg = SubscriberRegistry::new();
        assert!(!reg.try_charge(&Uuid::new_v4()));
    }
}
