//! Outbound ports: registry reads and audit writes.

use axon_audit::{AuditDetails, AuditError, AuditEventType, AuditLog};
use axon_registry::{Registry, RegistryApi, RegistryEntry, RegistryStore};

/// Read access to registry entries by NPI.
pub trait EntryLookup: Send + Sync {
    fn lookup(&self, npi: &str) -> Option<RegistryEntry>;
}

impl<S: RegistryStore> EntryLookup for Registry<S> {
    fn lookup(&self, npi: &str) -> Option<RegistryEntry> {
        self.find(npi)
    }
}

/// Destination for broker audit events.
pub trait AuditSink: Send + Sync {
    fn record(
        &self,
        event_type: AuditEventType,
        connection_id: &str,
        details: AuditDetails,
    ) -> Result<(), AuditError>;
}

impl AuditSink for AuditLog {
    fn record(
        &self,
        event_type: AuditEventType,
        connection_id: &str,
        details: AuditDetails,
    ) -> Result<(), AuditError> {
        self.append(event_type, connection_id, details).map(|_| ())
    }
}
