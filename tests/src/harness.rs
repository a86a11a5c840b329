//! Shared fixture: a full runtime in a temporary data directory with a
//! manual clock and one patient keypair.

use axon_audit::AuditEntry;
use axon_broker::{seal_request, ConnectionBrokerApi};
use axon_identity::{generate_keypair, generate_nonce, EncodedKeyPair};
use axon_registry::test_utils::{
    fixed_time, organization_registration, provider_registration, ORG_NPI, PROVIDER_NPI,
};
use axon_registry::{CredentialStatus, RegistryApi};
use axon_runtime::{AxonRuntime, RuntimeConfig};
use axon_types::{
    format_timestamp, ConnectOutcome, ConnectRequest, ManualTimeSource, SignedMessage, TimeSource,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const PATIENT_AGENT_ID: &str = "patient-agent-7";

pub struct TestNode {
    pub runtime: AxonRuntime,
    pub clock: Arc<ManualTimeSource>,
    pub patient: EncodedKeyPair,
    // Dropped last so the runtime releases its files first.
    _dir: TempDir,
}

impl TestNode {
    /// Empty registry.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let clock = Arc::new(ManualTimeSource::new(fixed_time()));
        let runtime = AxonRuntime::with_clock(RuntimeConfig::with_data_dir(dir.path()), clock.clone())
            .expect("runtime opens");
        Self {
            runtime,
            clock,
            patient: generate_keypair(),
            _dir: dir,
        }
    }

    /// Active organization with a reachable endpoint and an active
    /// physician affiliated to it.
    pub fn with_active_pair() -> Self {
        let node = Self::empty();
        let registry = node.runtime.registry();
        registry
            .register_organization(organization_registration(ORG_NPI))
            .expect("organization registers");
        registry
            .register_provider(provider_registration(PROVIDER_NPI))
            .expect("provider registers");
        registry
            .update_entity_status(ORG_NPI, CredentialStatus::Active)
            .expect("organization activates");
        registry
            .update_entity_status(PROVIDER_NPI, CredentialStatus::Active)
            .expect("provider activates");
        node
    }

    pub fn request(&self, npi: &str) -> ConnectRequest {
        ConnectRequest::new(
            format_timestamp(self.clock.now()),
            generate_nonce(16),
            PATIENT_AGENT_ID,
            npi,
            self.patient.public_key.clone(),
        )
    }

    pub fn sign(&self, request: &ConnectRequest) -> SignedMessage {
        seal_request(request, &self.patient.private_key, &self.patient.public_key)
            .expect("request signs")
    }

    pub fn connect(&self, message: &SignedMessage) -> ConnectOutcome {
        self.runtime
            .broker()
            .connect(message, &self.patient.public_key)
            .expect("audit write succeeds")
    }

    pub fn connect_to(&self, npi: &str) -> ConnectOutcome {
        self.connect(&self.sign(&self.request(npi)))
    }

    /// Every audit entry written so far, in file order.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        std::fs::read_to_string(self.runtime.audit_path())
            .expect("audit file readable")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("audit line parses"))
            .collect()
    }

    /// Audit entries for one connection.
    pub fn audit_for(&self, connection_id: &str) -> Vec<AuditEntry> {
        self.audit_entries()
            .into_iter()
            .filter(|entry| entry.connection_id == connection_id)
            .collect()
    }
}
