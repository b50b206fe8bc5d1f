//! Authoritative countdown clock

use std::time::Duration;
use tokio::time::Instant;

/// Phase of the countdown. Paused is a sub-state of running, so the
/// "paused implies running" invariant holds by construction.
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Not running; remaining time is the full configured duration.
    Idle,
    /// Counting down towards an absolute end instant.
    Running { target_end: Instant },
    /// Running but suspended, with the remaining time frozen.
    Paused { frozen: Duration },
}

/// The single source of truth for the countdown.
///
/// Remaining time is always recomputed from `now` against the target end
/// instant, never decremented, so missed ticks and scheduling jitter cannot
/// drift the clock. Calls that make no sense in the current phase (pause
/// while stopped, resume while not paused) are no-ops.
#[derive(Debug)]
pub struct TimerClock {
    full_duration: Duration,
    phase: Phase,
}

/// Point-in-time view of the clock, safe to hand to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
}

impl TimerClock {
    /// Create a stopped clock with the full duration on it.
    pub fn new(full_duration: Duration) -> Self {
        Self {
            full_duration,
            phase: Phase::Idle,
        }
    }

    /// Start the countdown from the full duration.
    ///
    /// Calling start while already running re-bases the target end instant,
    /// restarting the countdown.
    pub fn start(&mut self) {
        self.phase = Phase::Running {
            target_end: Instant::now() + self.full_duration,
        };
    }

    /// Freeze the remaining time. No-op unless currently counting down.
    pub fn pause(&mut self) {
        if let Phase::Running { target_end } = self.phase {
            let frozen = target_end.saturating_duration_since(Instant::now());
            self.phase = Phase::Paused { frozen };
        }
    }

    /// Continue from the frozen remaining time. No-op unless paused.
    pub fn resume(&mut self) {
        if let Phase::Paused { frozen } = self.phase {
            self.phase = Phase::Running {
                target_end: Instant::now() + frozen,
            };
        }
    }

    /// Stop the countdown and reset the remaining time to the full
    /// configured duration. Idempotent.
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Compute a fresh snapshot. Never returns a stale number: the
    /// remaining time is derived from the current instant on every call.
    pub fn snapshot(&self) -> TimerSnapshot {
        match self.phase {
            Phase::Idle => TimerSnapshot {
                remaining_seconds: self.full_duration.as_secs(),
                is_running: false,
                is_paused: false,
            },
            Phase::Running { target_end } => TimerSnapshot {
                remaining_seconds: target_end
                    .saturating_duration_since(Instant::now())
                    .as_secs(),
                is_running: true,
                is_paused: false,
            },
            Phase::Paused { frozen } => TimerSnapshot {
                remaining_seconds: frozen.as_secs(),
                is_running: true,
                is_paused: true,
            },
        }
    }

    /// Whether the clock is actively counting down (running and not paused).
    pub fn is_ticking(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }
}
