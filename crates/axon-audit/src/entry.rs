//! # Audit Entry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-clinical metadata attached to an entry. Keys serialize in insertion
/// order, and that order is part of the hashed record.
pub type AuditDetails = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    ConnectAttempt,
    ConnectGranted,
    ConnectDenied,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectAttempt => "connect_attempt",
            Self::ConnectGranted => "connect_granted",
            Self::ConnectDenied => "connect_denied",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit log.
///
/// Unknown fields make a line unreadable, so a field added after the fact
/// breaks the chain at that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditEntry {
    pub id: String,
    /// RFC 3339, millisecond precision, `Z` suffix.
    pub timestamp: String,
    pub event_type: AuditEventType,
    /// Shared by every entry of one connect attempt.
    pub connection_id: String,
    #[serde(default)]
    pub details: AuditDetails,
    pub prev_hash: String,
    pub hash: String,
}

impl AuditEntry {
    /// The hashed portion of this entry.
    pub fn record(&self) -> AuditRecord<'_> {
        AuditRecord {
            id: &self.id,
            timestamp: &self.timestamp,
            event_type: self.event_type,
            connection_id: &self.connection_id,
            details: &self.details,
            prev_hash: &self.prev_hash,
        }
    }
}

/// An entry without its `hash`. Field order here is the canonical order.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AuditRecord<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub event_type: AuditEventType,
    pub connection_id: &'a str,
    pub details: &'a AuditDetails,
    pub prev_hash: &'a str,
}
