//! Broker error types.

use axon_audit::AuditError;
use thiserror::Error;

/// Infrastructure failure while brokering.
///
/// Request problems are never errors; they are denials. This is only returned
/// when a decision could not be recorded, in which case no decision is
/// returned at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("Audit write failed: {0}")]
    Audit(#[from] AuditError),
}
