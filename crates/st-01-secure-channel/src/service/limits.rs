//! Bounded waits and sizes for one session.

use std::time::Duration;

use crate::transport::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_REASSEMBLY_GRACE};

/// Default bound on the whole three-message handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on waiting for the next request (or response).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeouts and size limits applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Whole handshake, M1 through M3.
    pub handshake_timeout: Duration,
    /// Each read of a request (server) or response (client).
    pub idle_timeout: Duration,
    /// Largest accepted message.
    pub max_message_size: usize,
    /// Wait for the rest of a message that does not verify yet.
    pub reassembly_grace: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            reassembly_grace: DEFAULT_REASSEMBLY_GRACE,
        }
    }
}

impl SessionLimits {
    /// Same limits with a different handshake timeout.
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Same limits with a different idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
