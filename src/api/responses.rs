//! Wire message and API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerSnapshot;

/// The state message pushed to every viewer.
///
/// Field names match what the display clients already consume:
/// `{"type":"time-sync","time":86400,"isRunning":false,"isPaused":false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSync {
    #[serde(rename = "type")]
    pub kind: TimeSyncKind,
    /// Seconds remaining on the countdown.
    pub time: u64,
    pub is_running: bool,
    pub is_paused: bool,
}

/// Single-valued tag so every outbound frame carries `"type":"time-sync"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSyncKind {
    #[serde(rename = "time-sync")]
    TimeSync,
}

impl TimeSync {
    pub fn from_snapshot(snapshot: TimerSnapshot) -> Self {
        Self {
            kind: TimeSyncKind::TimeSync,
            time: snapshot.remaining_seconds,
            is_running: snapshot.is_running,
            is_paused: snapshot.is_paused,
        }
    }
}

/// Diagnostics returned by GET /status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimeSync,
    pub connected_subscribers: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_command: Option<String>,
    pub last_command_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
