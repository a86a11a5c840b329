//! # Replay Guard
//!
//! Tracks nonces seen inside a sliding time window.
//!
//! ## Rules
//!
//! - `|now - timestamp| > window` is rejected as `timestamp_expired`. An offset
//!   of exactly the window is accepted.
//! - A nonce already in the map is rejected as `nonce_replayed`.
//! - Otherwise the nonce is recorded and every entry whose timestamp is more
//!   than one window old is purged.
//!
//! State is in-process only. A restart forgets every nonce, and two broker
//! processes do not share state.

use crate::domain::config::{to_chrono, DEFAULT_WINDOW};
use axon_types::{parse_timestamp, SystemTimeSource, TimeSource};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Why a (nonce, timestamp) pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayRejection {
    /// Timestamp unparsable or outside the window.
    TimestampExpired,
    /// Nonce already used inside the window.
    NonceReplayed,
}

impl fmt::Display for ReplayRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TimestampExpired => "timestamp_expired",
            Self::NonceReplayed => "nonce_replayed",
        })
    }
}

/// Rejects stale timestamps and reused nonces for one broker.
///
/// Each accepted nonce is remembered with the timestamp it arrived with and
/// dropped once that timestamp falls more than one window behind the clock.
pub struct ReplayGuard {
    window: chrono::Duration,
    clock: Arc<dyn TimeSource>,
    /// Nonce -> request timestamp it arrived with.
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ReplayGuard {
    /// Guard with the given window, reading the system clock.
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemTimeSource))
    }

    /// Guard whose window is measured against `clock`.
    pub fn with_clock(window: Duration, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            window: to_chrono(window),
            clock,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Check a pair and, if accepted, record the nonce.
    ///
    /// The check and the insert happen under one lock, so two concurrent
    /// calls with the same nonce yield exactly one `Ok`.
    pub fn validate(&self, nonce: &str, timestamp: &str) -> Result<(), ReplayRejection> {
        let now = self.clock.now();
        let Some(sent_at) = parse_timestamp(timestamp) else {
            return Err(ReplayRejection::TimestampExpired);
        };
        if (now - sent_at).abs() > self.window {
            return Err(ReplayRejection::TimestampExpired);
        }

        let mut seen = self.seen.lock();
        if seen.contains_key(nonce) {
            return Err(ReplayRejection::NonceReplayed);
        }
        seen.insert(nonce.to_string(), sent_at);

        let window = self.window;
        seen.retain(|_, at| now - *at <= window);
        Ok(())
    }

    /// Number of nonces currently tracked.
    pub fn tracked(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayGuard")
            .field("window", &self.window)
            .field("tracked", &self.tracked())
            .finish()
    }
}
