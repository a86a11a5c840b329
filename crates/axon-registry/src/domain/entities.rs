//! # Registry Entities
//!
//! The persisted shape of a registry entry and the registration inputs that
//! build one.
//!
//! Optional attributes are omitted from JSON when unset rather than written as
//! `null`. Registration inputs use builder methods so an optional attribute is
//! only set when a caller actually supplies it.

use axon_types::rfc3339_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schema version written into every entry.
pub const REGISTRY_VERSION: &str = "1.0.0";

// =============================================================================
// STATUS ENUMS
// =============================================================================

/// Status of an entity or of a single credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Pending,
    Active,
    Expired,
    Suspended,
    Revoked,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "suspended" => Ok(Self::Suspended),
            "revoked" => Ok(Self::Revoked),
            other => Err(format!("unknown credential status: {other}")),
        }
    }
}

/// Kind of credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    License,
    Certification,
    Privilege,
}

/// How a credential was verified.
///
/// Only `SelfAttested` is ever produced by the registry. The stronger tiers
/// exist so files written by a verifying deployment still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    SelfAttested,
    NppesMatched,
    StateBoardVerified,
}

/// Last known reachability of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Reachable,
    Unreachable,
    Unknown,
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reachable" => Ok(Self::Reachable),
            "unreachable" => Ok(Self::Unreachable),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown health status: {other}")),
        }
    }
}

/// Discriminant of [`EntityKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Individual,
    Organization,
}

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// A license, certification, or privilege held by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub issuer: String,
    pub identifier: String,
    pub status: CredentialStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub verification_source: VerificationSource,
}

/// A credential as supplied by a registrant.
///
/// There is no verification source here; the registry stamps every credential
/// it accepts as self-attested. A `verification_source` key in incoming JSON is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCredential {
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub issuer: String,
    pub identifier: String,
    pub status: CredentialStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl NewCredential {
    pub fn new(
        credential_type: CredentialType,
        issuer: impl Into<String>,
        identifier: impl Into<String>,
        status: CredentialStatus,
    ) -> Self {
        Self {
            credential_type,
            issuer: issuer.into(),
            identifier: identifier.into(),
            status,
            issued_at: None,
            expires_at: None,
        }
    }

    pub fn issued_at(mut self, at: impl Into<String>) -> Self {
        self.issued_at = Some(at.into());
        self
    }

    pub fn expires_at(mut self, at: impl Into<String>) -> Self {
        self.expires_at = Some(at.into());
        self
    }

    /// Convert into a stored record with a self-attested source.
    pub fn self_attested(self) -> CredentialRecord {
        CredentialRecord {
            credential_type: self.credential_type,
            issuer: self.issuer,
            identifier: self.identifier,
            status: self.status,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            verification_source: VerificationSource::SelfAttested,
        }
    }
}

/// Network endpoint of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronEndpoint {
    pub url: String,
    pub protocol_version: String,
    pub health_status: HealthStatus,
    #[serde(
        default,
        with = "rfc3339_millis::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl NeuronEndpoint {
    /// New endpoint with unknown health and no heartbeat.
    pub fn new(url: impl Into<String>, protocol_version: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocol_version: protocol_version.into(),
            health_status: HealthStatus::Unknown,
            last_heartbeat: None,
        }
    }

    pub fn with_health(mut self, health_status: HealthStatus) -> Self {
        self.health_status = health_status;
        self
    }

    pub fn with_heartbeat(mut self, at: DateTime<Utc>) -> Self {
        self.last_heartbeat = Some(at);
        self
    }
}

/// Link from an individual to an organization. Used as a lookup key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAffiliation {
    pub organization_npi: String,
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neuron_endpoint: Option<String>,
}

impl OrganizationAffiliation {
    pub fn new(organization_npi: impl Into<String>, organization_name: impl Into<String>) -> Self {
        Self {
            organization_npi: organization_npi.into(),
            organization_name: organization_name.into(),
            department: None,
            privileges: None,
            neuron_endpoint: None,
        }
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

// =============================================================================
// REGISTRY ENTRY
// =============================================================================

/// Fields that only individuals carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualProfile {
    #[serde(default)]
    pub provider_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subspecialty: Option<String>,
    /// The first affiliation is the primary one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliations: Option<Vec<OrganizationAffiliation>>,
}

/// Fields that only organizations carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neuron_endpoint: Option<NeuronEndpoint>,
}

/// Entity variant, tagged on the wire by `entity_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum EntityKind {
    Individual(IndividualProfile),
    Organization(OrganizationProfile),
}

/// One registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub npi: String,
    #[serde(flatten)]
    pub kind: EntityKind,
    pub name: String,
    pub credential_status: CredentialStatus,
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
    #[serde(with = "rfc3339_millis")]
    pub registered_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub last_updated: DateTime<Utc>,
    pub registry_version: String,
}

impl RegistryEntry {
    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Individual(_) => EntityType::Individual,
            EntityKind::Organization(_) => EntityType::Organization,
        }
    }

    pub fn is_organization(&self) -> bool {
        matches!(self.kind, EntityKind::Organization(_))
    }

    /// Provider type tags. Empty for organizations.
    pub fn provider_types(&self) -> &[String] {
        match &self.kind {
            EntityKind::Individual(profile) => &profile.provider_types,
            EntityKind::Organization(_) => &[],
        }
    }

    pub fn specialty(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Individual(profile) => profile.specialty.as_deref(),
            EntityKind::Organization(_) => None,
        }
    }

    pub fn organization_name(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Organization(profile) => profile.organization_name.as_deref(),
            EntityKind::Individual(_) => None,
        }
    }

    /// Affiliations in registration order. Empty for organizations.
    pub fn affiliations(&self) -> &[OrganizationAffiliation] {
        match &self.kind {
            EntityKind::Individual(profile) => profile.affiliations.as_deref().unwrap_or(&[]),
            EntityKind::Organization(_) => &[],
        }
    }

    /// The affiliation used to resolve an individual's endpoint.
    pub fn primary_affiliation(&self) -> Option<&OrganizationAffiliation> {
        self.affiliations().first()
    }

    /// An organization's own endpoint. Always `None` for individuals.
    pub fn endpoint(&self) -> Option<&NeuronEndpoint> {
        match &self.kind {
            EntityKind::Organization(profile) => profile.neuron_endpoint.as_ref(),
            EntityKind::Individual(_) => None,
        }
    }

    pub fn credential(&self, identifier: &str) -> Option<&CredentialRecord> {
        self.credentials.iter().find(|c| c.identifier == identifier)
    }
}

// =============================================================================
// REGISTRATION INPUTS
// =============================================================================

/// Input for registering an individual provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistration {
    pub npi: String,
    pub name: String,
    pub provider_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subspecialty: Option<String>,
    #[serde(default)]
    pub credentials: Vec<NewCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliations: Option<Vec<OrganizationAffiliation>>,
}

impl ProviderRegistration {
    pub fn new(npi: impl Into<String>, name: impl Into<String>, provider_types: Vec<String>) -> Self {
        Self {
            npi: npi.into(),
            name: name.into(),
            provider_types,
            degrees: None,
            specialty: None,
            subspecialty: None,
            credentials: Vec::new(),
            affiliations: None,
        }
    }

    pub fn degrees(mut self, degrees: Vec<String>) -> Self {
        self.degrees = Some(degrees);
        self
    }

    pub fn specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }

    pub fn subspecialty(mut self, subspecialty: impl Into<String>) -> Self {
        self.subspecialty = Some(subspecialty.into());
        self
    }

    pub fn credential(mut self, credential: NewCredential) -> Self {
        self.credentials.push(credential);
        self
    }

    /// Append an affiliation. The first one added is the primary.
    pub fn affiliation(mut self, affiliation: OrganizationAffiliation) -> Self {
        self.affiliations.get_or_insert_with(Vec::new).push(affiliation);
        self
    }
}

/// Input for registering an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRegistration {
    pub npi: String,
    pub name: String,
    pub organization_name: String,
    pub endpoint: NeuronEndpoint,
    #[serde(default)]
    pub credentials: Vec<NewCredential>,
}

impl OrganizationRegistration {
    pub fn new(
        npi: impl Into<String>,
        name: impl Into<String>,
        organization_name: impl Into<String>,
        endpoint: NeuronEndpoint,
    ) -> Self {
        Self {
            npi: npi.into(),
            name: name.into(),
            organization_name: organization_name.into(),
            endpoint,
            credentials: Vec::new(),
        }
    }

    pub fn credential(mut self, credential: NewCredential) -> Self {
        self.credentials.push(credential);
        self
    }
}
