//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the registry service requires from its host.

use crate::domain::entities::RegistryEntry;
use crate::domain::errors::StoreError;

/// Whole-document persistence for registry entries.
///
/// Production: `JsonFileStore`
/// Testing: `InMemoryStore`
pub trait RegistryStore: Send + Sync {
    /// Load every entry in insertion order. A missing store is empty.
    fn load(&self) -> Result<Vec<RegistryEntry>, StoreError>;

    /// Replace the stored document with `entries`.
    ///
    /// ## Atomicity
    ///
    /// A concurrent reader sees either the previous document or this one,
    /// never a partial write.
    fn save(&self, entries: &[RegistryEntry]) -> Result<(), StoreError>;
}

/// Read-only view of the provider-type and action taxonomy.
pub trait ProviderCatalog: Send + Sync {
    fn type_exists(&self, type_id: &str) -> bool;

    fn action_exists(&self, action_id: &str) -> bool;
}
