//! Shared fixtures for registry tests.

use crate::domain::entities::{
    CredentialStatus, CredentialType, EntityKind, HealthStatus, IndividualProfile, NeuronEndpoint,
    NewCredential, OrganizationAffiliation, OrganizationProfile, OrganizationRegistration,
    ProviderRegistration, RegistryEntry, REGISTRY_VERSION,
};
use chrono::{DateTime, TimeZone, Utc};

/// Valid organization NPI.
pub const ORG_NPI: &str = "1245319599";
/// Valid individual provider NPI.
pub const PROVIDER_NPI: &str = "1679576722";
/// Second valid individual provider NPI.
pub const SECOND_PROVIDER_NPI: &str = "1376841239";
/// Valid NPI that fixtures never register.
pub const UNREGISTERED_NPI: &str = "9999999995";

pub const ORG_NAME: &str = "General Hospital";
pub const ENDPOINT_URL: &str = "https://neuron.general-hospital.example/axon";

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn reachable_endpoint() -> NeuronEndpoint {
    NeuronEndpoint::new(ENDPOINT_URL, "1.0.0").with_health(HealthStatus::Reachable)
}

pub fn license(identifier: &str) -> NewCredential {
    NewCredential::new(
        CredentialType::License,
        "State Medical Board",
        identifier,
        CredentialStatus::Active,
    )
}

pub fn organization_registration(npi: &str) -> OrganizationRegistration {
    OrganizationRegistration::new(npi, ORG_NAME, ORG_NAME, reachable_endpoint())
}

/// Physician affiliated with [`ORG_NPI`].
pub fn provider_registration(npi: &str) -> ProviderRegistration {
    ProviderRegistration::new(npi, "Dr. Jane Smith", vec!["physician".into()])
        .specialty("Cardiology")
        .affiliation(OrganizationAffiliation::new(ORG_NPI, ORG_NAME))
}

pub fn organization_entry(npi: &str) -> RegistryEntry {
    RegistryEntry {
        npi: npi.into(),
        kind: EntityKind::Organization(OrganizationProfile {
            organization_name: Some(ORG_NAME.into()),
            neuron_endpoint: Some(reachable_endpoint()),
        }),
        name: ORG_NAME.into(),
        credential_status: CredentialStatus::Active,
        credentials: Vec::new(),
        registered_at: fixed_time(),
        last_updated: fixed_time(),
        registry_version: REGISTRY_VERSION.into(),
    }
}

pub fn provider_entry(npi: &str) -> RegistryEntry {
    RegistryEntry {
        npi: npi.into(),
        kind: EntityKind::Individual(IndividualProfile {
            provider_types: vec!["physician".into()],
            specialty: Some("Cardiology".into()),
            affiliations: Some(vec![OrganizationAffiliation::new(ORG_NPI, ORG_NAME)]),
            ..Default::default()
        }),
        name: "Dr. Jane Smith".into(),
        credential_status: CredentialStatus::Active,
        credentials: Vec::new(),
        registered_at: fixed_time(),
        last_updated: fixed_time(),
        registry_version: REGISTRY_VERSION.into(),
    }
}
