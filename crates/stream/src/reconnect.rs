//! Fixed-delay reconnection policy for the notification stream.
//!
//! Failures are retried forever with the same delay: no backoff, no
//! jitter, no attempt cap.

use std::time::Duration;

/// Default delay between a connection failure and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Tunable parameters for reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Wait between a failure and the next `connect()`.
    pub delay: Duration,
}

impl ReconnectConfig {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}
