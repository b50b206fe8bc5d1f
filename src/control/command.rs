//! Inbound control message parsing

use serde::Deserialize;

/// A control command against the countdown clock.
///
/// The wire format is a tagged JSON object, `{"type": "START"}` etc. Older
/// admin clients also send a `time` field alongside the tag; it predates the
/// end-instant clock model and is accepted but ignored.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TimerCommand {
    #[serde(rename = "START")]
    Start {
        #[serde(default, rename = "time")]
        _time: Option<u64>,
    },
    #[serde(rename = "PAUSE")]
    Pause,
    #[serde(rename = "RESUME")]
    Resume,
    #[serde(rename = "STOP")]
    Stop,
}

impl TimerCommand {
    /// Parse a control message. Malformed payloads and unknown command
    /// types yield `None` and are dropped without a response.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// Command name as it appears on the wire, for logging and the
    /// last-command diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "START",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
            Self::Stop => "STOP",
        }
    }
}
