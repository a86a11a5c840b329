//! # Broker Service
//!
//! [`ConnectionBroker`] runs the connect pipeline described in the crate
//! docs. It holds no per-connection state; the only mutable state is the
//! replay guard's nonce map.


use crate::domain::config::{to_chrono, BrokerConfig};
use crate::domain::endpoint::resolve_endpoint;
use crate::domain::envelope::open_request;
use crate::domain::errors::BrokerError;
use crate::domain::replay::{ReplayGuard, ReplayRejection};
use crate::ports::inbound::ConnectionBrokerApi;
use crate::ports::outbound::{AuditSink, EntryLookup};
use axon_audit::{AuditDetails, AuditEventType};
use axon_registry::CredentialStatus;
use axon_types::{
    ConnectDenial, ConnectGrant, ConnectOutcome, DenialCode, SignedMessage, SystemTimeSource,
    TimeSource,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides connect requests against a registry and records each decision in
/// an audit sink.
///
/// Every call to `connect` gets a fresh connection id. Denials and grants are
/// audited before they are returned; if the audit write fails the call
/// returns [`BrokerError::Audit`] instead of a decision.
pub struct ConnectionBroker {
    registry: Arc<dyn EntryLookup>,
    audit: Arc<dyn AuditSink>,
    replay: ReplayGuard,
    clock: Arc<dyn TimeSource>,
    heartbeat_stale_after: chrono::Duration,
}

impl ConnectionBroker {
    /// Broker on the system clock.
    pub fn new(
        registry: Arc<dyn EntryLookup>,
        audit: Arc<dyn AuditSink>,
        config: BrokerConfig,
    ) -> Self {
        Self::with_clock(registry, audit, config, Arc::new(SystemTimeSource))
    }

    /// Build a broker whose replay window and heartbeat checks read `clock`.
    pub fn with_clock(
        registry: Arc<dyn EntryLookup>,
        audit: Arc<dyn AuditSink>,
        config: BrokerConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            registry,
            audit,
            replay: ReplayGuard::with_clock(config.replay_window, clock.clone()),
            clock,
            heartbeat_stale_after: to_chrono(config.heartbeat_stale_after),
        }
    }

    /// The nonce state this broker checks against.
    pub fn replay_guard(&self) -> &ReplayGuard {
        &self.replay
    }

    /// Audit a denial and build the outcome.
    fn deny(
        &self,
        connection_id: &str,
        code: DenialCode,
        provider_npi: Option<&str>,
    ) -> Result<ConnectOutcome, BrokerError> {
        let mut details = AuditDetails::new();
        details.insert("code".into(), code.as_str().into());
        if let Some(npi) = provider_npi {
            details.insert("provider_npi".into(), npi.into());
        }
        self.audit
            .record(AuditEventType::ConnectDenied, connection_id, details)?;

        warn!(connection_id, %code, "connection denied");
        Ok(ConnectOutcome::Denial(ConnectDenial::new(connection_id, code)))
    }
}

impl ConnectionBrokerApi for ConnectionBroker {
    fn connect(
        &self,
        message: &SignedMessage,
        patient_public_key: &str,
    ) -> Result<ConnectOutcome, BrokerError> {
        let connection_id = uuid::Uuid::new_v4().to_string();

        let request = match open_request(message, patient_public_key) {
            Ok(request) => request,
            Err(stage) => {
                debug!(connection_id = %connection_id, %stage, "envelope rejected");
                return self.deny(&connection_id, DenialCode::SignatureInvalid, None);
            }
        };
        let npi = request.provider_npi.as_str();

        let mut attempt = AuditDetails::new();
        attempt.insert("patient_agent_id".into(), request.patient_agent_id.clone().into());
        attempt.insert("provider_npi".into(), npi.into());
        self.audit
            .record(AuditEventType::ConnectAttempt, &connection_id, attempt)?;

        if let Err(rejection) = self.replay.validate(&request.nonce, &request.timestamp) {
            let code = match rejection {
                ReplayRejection::NonceReplayed => DenialCode::NonceReplayed,
                ReplayRejection::TimestampExpired => DenialCode::TimestampExpired,
            };
            return self.deny(&connection_id, code, Some(npi));
        }

        let Some(entry) = self.registry.lookup(npi) else {
            return self.deny(&connection_id, DenialCode::ProviderNotFound, Some(npi));
        };

        if entry.credential_status != CredentialStatus::Active {
            debug!(connection_id = %connection_id, status = %entry.credential_status, "target not active");
            return self.deny(&connection_id, DenialCode::CredentialsInvalid, Some(npi));
        }

        let endpoint = match resolve_endpoint(
            &entry,
            self.registry.as_ref(),
            self.clock.now(),
            self.heartbeat_stale_after,
        ) {
            Ok(endpoint) => endpoint,
            Err(reason) => {
                warn!(connection_id = %connection_id, %reason, "endpoint unavailable");
                return self.deny(&connection_id, DenialCode::EndpointUnavailable, Some(npi));
            }
        };

        let mut granted = AuditDetails::new();
        granted.insert("provider_npi".into(), npi.into());
        granted.insert("neuron_endpoint".into(), endpoint.url.clone().into());
        self.audit
            .record(AuditEventType::ConnectGranted, &connection_id, granted)?;

        info!(connection_id = %connection_id, provider_npi = npi, "connection granted");
        Ok(ConnectOutcome::Grant(ConnectGrant {
            connection_id,
            provider_npi: request.provider_npi,
            neuron_endpoint: endpoint.url,
            protocol_version: endpoint.protocol_version,
        }))
    }
}
