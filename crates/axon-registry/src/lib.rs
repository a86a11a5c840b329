//! # Axon Registry
//!
//! The registry of providers (individuals) and organizations that the broker
//! consults on every connect request.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Identifiers are checksum-valid | `validate_npi` on registration and on load |
//! | Identifiers are unique | `DuplicateIdentifier` on registration |
//! | Entity type never changes | no operation rewrites `EntityKind` |
//! | Credentials are self-attested | registration and `add_credential` force the source |
//! | Memory matches disk | a failed write rolls the in-memory change back |
//! | No partial files | temp file in the same directory, then rename |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - entities, errors, NPI checksum, search filter
//! - `ports/` - `RegistryApi` (inbound), `RegistryStore` and `ProviderCatalog` (outbound)
//! - `adapters/` - JSON file store, in-memory store, static catalog
//! - `service/` - `Registry`, the application service
//!
//! ## Usage
//!
//! ```ignore
//! use axon_registry::{ProviderRegistration, Registry, RegistryApi, SearchQuery, StaticCatalog};
//! use std::sync::Arc;
//!
//! let registry = Registry::open("./data/registry.json", Arc::new(StaticCatalog::builtin()))?;
//! registry.register_provider(ProviderRegistration::new(
//!     "1234567893",
//!     "Dr. Smith",
//!     vec!["physician".into()],
//! ))?;
//! assert_eq!(registry.search(&SearchQuery::new().name("smith")).len(), 1);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{InMemoryStore, JsonFileStore, StaticCatalog};
pub use domain::entities::{
    CredentialRecord, CredentialStatus, CredentialType, EntityKind, EntityType, HealthStatus,
    IndividualProfile, NeuronEndpoint, NewCredential, OrganizationAffiliation,
    OrganizationProfile, OrganizationRegistration, ProviderRegistration, RegistryEntry,
    VerificationSource, REGISTRY_VERSION,
};
pub use domain::errors::{CatalogError, RegistryError, StoreError};
pub use domain::npi::validate_npi;
pub use domain::search::{SearchQuery, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
pub use ports::inbound::RegistryApi;
pub use ports::outbound::{ProviderCatalog, RegistryStore};
pub use service::Registry;
