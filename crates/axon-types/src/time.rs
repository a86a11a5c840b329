//! # Clock Port
//!
//! Abstract time source so replay windows and heartbeat staleness can be
//! tested deterministically.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Default time source using the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// RFC 3339 text with millisecond precision and a `Z` suffix,
/// e.g. `2026-10-17T09:30:00.123Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse RFC 3339 text into UTC. Returns `None` for anything else.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Serde adapter writing `DateTime<Utc>` with [`format_timestamp`].
///
/// Use as `#[serde(with = "axon_types::rfc3339_millis")]`.
pub mod rfc3339_millis {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid RFC 3339 timestamp: {text}")))
    }

    /// Same format for `Option<DateTime<Utc>>`.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => serializer.serialize_str(&super::super::format_timestamp(*at)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => super::super::parse_timestamp(&text)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid RFC 3339 timestamp: {text}"))),
                None => Ok(None),
            }
        }
    }
}

/// A time source that only moves when told to.
///
/// Enable with the `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct ManualTimeSource {
    now: parking_lot::RwLock<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl ManualTimeSource {
    /// Create a clock pinned at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: parking_lot::RwLock::new(at),
        }
    }

    /// Create a clock pinned at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Jump to an absolute time.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.write() = at;
    }

    /// Move forward (or backward, for negative durations).
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
