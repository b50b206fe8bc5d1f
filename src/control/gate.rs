//! Injected authorization for control commands
//!
//! The server never stores credentials or manages sessions; callers supply a
//! predicate deciding whether a given sender may issue commands. The two
//! gates here cover the deployment modes the CLI exposes.

/// What the transport knows about a command sender.
#[derive(Debug, Clone, Default)]
pub struct SenderCredentials {
    /// Credential presented at connect time (the `key` query parameter on
    /// the WebSocket endpoint), if any.
    pub key: Option<String>,
}

/// Decides whether a sender may issue control commands.
pub trait ControlGate: Send + Sync {
    fn is_authorized(&self, sender: &SenderCredentials) -> bool;
}

/// Accepts every sender. Default when no control key is configured.
#[derive(Debug, Clone, Copy)]
pub struct AllowAll;

impl ControlGate for AllowAll {
    fn is_authorized(&self, _sender: &SenderCredentials) -> bool {
        true
    }
}

/// Requires the sender to have presented a matching shared key.
#[derive(Debug, Clone)]
pub struct SharedKey {
    key: String,
}

impl SharedKey {
    pub fn new(key: String) -> Self {
        Self { key }
    }
}

impl ControlGate for SharedKey {
    fn is_authorized(&self, sender: &SenderCredentials) -> bool {
        sender.key.as_deref() == Some(self.key.as_str())
    }
}
