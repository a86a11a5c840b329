//! # Endpoint Resolution
//!
//! | Target | Endpoint used |
//! |--------|---------------|
//! | organization | its own `neuron_endpoint` |
//! | individual | the endpoint of the organization named by its first affiliation |
//!
//! An endpoint is usable when it exists, is not `unreachable`, and its
//! heartbeat (if any) is no older than the staleness threshold. A missing
//! heartbeat is not stale.

use crate::ports::outbound::EntryLookup;
use axon_registry::{HealthStatus, NeuronEndpoint, RegistryEntry};
use chrono::{DateTime, Utc};
use std::fmt;

/// The endpoint a grant points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub protocol_version: String,
}

impl From<&NeuronEndpoint> for ResolvedEndpoint {
    fn from(endpoint: &NeuronEndpoint) -> Self {
        Self {
            url: endpoint.url.clone(),
            protocol_version: endpoint.protocol_version.clone(),
        }
    }
}

/// Why no endpoint could be resolved. All map to `ENDPOINT_UNAVAILABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointUnavailable {
    /// Individual with no affiliations.
    NoAffiliation,
    /// First affiliation names an NPI the registry does not hold.
    OrganizationNotFound,
    /// Owning organization has no endpoint.
    NoEndpoint,
    Unreachable,
    StaleHeartbeat,
}

impl fmt::Display for EndpointUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoAffiliation => "no affiliation",
            Self::OrganizationNotFound => "affiliated organization not found",
            Self::NoEndpoint => "no endpoint",
            Self::Unreachable => "endpoint unreachable",
            Self::StaleHeartbeat => "stale heartbeat",
        })
    }
}

/// True when `last_heartbeat` is present and older than `stale_after`.
pub fn is_heartbeat_stale(
    last_heartbeat: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> bool {
    last_heartbeat.is_some_and(|at| now - at > stale_after)
}

fn check_endpoint(
    endpoint: Option<&NeuronEndpoint>,
    now: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> Result<ResolvedEndpoint, EndpointUnavailable> {
    let endpoint = endpoint.ok_or(EndpointUnavailable::NoEndpoint)?;
    if endpoint.health_status == HealthStatus::Unreachable {
        return Err(EndpointUnavailable::Unreachable);
    }
    if is_heartbeat_stale(endpoint.last_heartbeat, now, stale_after) {
        return Err(EndpointUnavailable::StaleHeartbeat);
    }
    Ok(endpoint.into())
}

/// Resolve the endpoint for `entry`, looking up its organization if needed.
///
/// The affiliated organization's own credential status is not consulted.
pub fn resolve_endpoint<L: EntryLookup + ?Sized>(
    entry: &RegistryEntry,
    lookup: &L,
    now: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> Result<ResolvedEndpoint, EndpointUnavailable> {
    if entry.is_organization() {
        return check_endpoint(entry.endpoint(), now, stale_after);
    }

    let affiliation = entry
        .primary_affiliation()
        .ok_or(EndpointUnavailable::NoAffiliation)?;
    let organization = lookup
        .lookup(&affiliation.organization_npi)
        .ok_or(EndpointUnavailable::OrganizationNotFound)?;
    check_endpoint(organization.endpoint(), now, stale_after)
}
