//! # Inbound Ports (Driving Ports)
//!
//! The registry API used by the transport layer and read by the broker.

use crate::domain::entities::{
    CredentialStatus, HealthStatus, NeuronEndpoint, NewCredential, OrganizationRegistration,
    ProviderRegistration, RegistryEntry,
};
use crate::domain::errors::RegistryError;
use crate::domain::search::SearchQuery;

/// Primary API of the registry.
///
/// Every mutation stamps `last_updated` and rewrites the whole store before
/// returning. If that write fails the mutation is undone and
/// `RegistryError::Persistence` is returned.
pub trait RegistryApi: Send + Sync {
    /// Register an individual provider. Starts `pending`.
    ///
    /// ## Errors
    ///
    /// - `InvalidIdentifier`: checksum failed
    /// - `DuplicateIdentifier`: already registered
    /// - `UnknownProviderType`: a tag is not in the catalog
    fn register_provider(
        &self,
        registration: ProviderRegistration,
    ) -> Result<RegistryEntry, RegistryError>;

    /// Register an organization with its endpoint. Starts `pending`.
    ///
    /// ## Errors
    ///
    /// - `InvalidIdentifier`, `DuplicateIdentifier`
    fn register_organization(
        &self,
        registration: OrganizationRegistration,
    ) -> Result<RegistryEntry, RegistryError>;

    /// Look up an entry by identifier.
    fn find(&self, npi: &str) -> Option<RegistryEntry>;

    /// Append a credential, stamped self-attested.
    fn add_credential(&self, npi: &str, credential: NewCredential) -> Result<(), RegistryError>;

    /// Change the status of one credential, matched by its identifier.
    fn update_credential_status(
        &self,
        npi: &str,
        credential_identifier: &str,
        status: CredentialStatus,
    ) -> Result<(), RegistryError>;

    /// Replace an organization's endpoint.
    ///
    /// ## Errors
    ///
    /// - `NotFound`, `NotAnOrganization`
    fn update_endpoint(&self, npi: &str, endpoint: NeuronEndpoint) -> Result<(), RegistryError>;

    /// Change an entity's overall credential status.
    fn update_entity_status(&self, npi: &str, status: CredentialStatus)
        -> Result<(), RegistryError>;

    /// Stamp the organization's endpoint heartbeat with the current time.
    ///
    /// ## Errors
    ///
    /// - `NotFound`, `NotAnOrganization`, `EndpointNotFound`
    fn record_heartbeat(&self, npi: &str, health_status: HealthStatus)
        -> Result<(), RegistryError>;

    /// Filter in insertion order, then paginate.
    fn search(&self, query: &SearchQuery) -> Vec<RegistryEntry>;
}
