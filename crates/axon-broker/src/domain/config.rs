//! Broker configuration.

use std::time::Duration;

/// Default replay window and heartbeat staleness threshold.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Maximum distance between a request timestamp and now, either way.
    pub replay_window: Duration,
    /// A heartbeat older than this makes an endpoint unavailable.
    pub heartbeat_stale_after: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            replay_window: DEFAULT_WINDOW,
            heartbeat_stale_after: DEFAULT_WINDOW,
        }
    }
}

/// Convert for `chrono` arithmetic, saturating on overflow.
pub(crate) fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
