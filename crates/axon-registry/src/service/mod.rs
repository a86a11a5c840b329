//! # Registry Service
//!
//! The application service implementing [`RegistryApi`].
//!
//! ## Concurrency
//!
//! State sits behind one `RwLock`. `find` and `search` share the read lock.
//! Every mutation holds the write lock across its validation, the in-memory
//! change, and the store rewrite, so writers are serialized and readers never
//! observe a change that failed to persist.


use crate::adapters::JsonFileStore;
use crate::domain::entities::{
    CredentialStatus, EntityKind, HealthStatus, IndividualProfile, NeuronEndpoint, NewCredential,
    OrganizationProfile, OrganizationRegistration, ProviderRegistration, RegistryEntry,
    REGISTRY_VERSION,
};
use crate::domain::errors::{RegistryError, StoreError};
use crate::domain::npi::validate_npi;
use crate::domain::search::SearchQuery;
use crate::ports::inbound::RegistryApi;
use crate::ports::outbound::{ProviderCatalog, RegistryStore};
use axon_types::{SystemTimeSource, TimeSource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Entries in insertion order plus an NPI index into them.
#[derive(Debug, Default)]
struct RegistryState {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl RegistryState {
    fn from_entries(entries: Vec<RegistryEntry>) -> Result<Self, StoreError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.npi.clone(), position).is_some() {
                return Err(StoreError::Corrupt {
                    path: "<store>".into(),
                    reason: format!("entry \"{}\" appears twice", entry.npi),
                });
            }
        }
        Ok(Self { entries, index })
    }

    fn get(&self, npi: &str) -> Option<&RegistryEntry> {
        self.index.get(npi).map(|&position| &self.entries[position])
    }

    fn position(&self, npi: &str) -> Result<usize, RegistryError> {
        self.index
            .get(npi)
            .copied()
            .ok_or_else(|| RegistryError::NotFound { npi: npi.into() })
    }
}

/// The provider and organization registry.
pub struct Registry<S: RegistryStore = JsonFileStore> {
    store: S,
    catalog: Arc<dyn ProviderCatalog>,
    clock: Arc<dyn TimeSource>,
    state: RwLock<RegistryState>,
}

impl Registry<JsonFileStore> {
    /// Open (or create on first write) the registry file at `path`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        catalog: Arc<dyn ProviderCatalog>,
    ) -> Result<Self, RegistryError> {
        Self::new(
            JsonFileStore::new(path),
            catalog,
            Arc::new(SystemTimeSource),
        )
    }
}

impl<S: RegistryStore> Registry<S> {
    /// Load every entry from `store`.
    pub fn new(
        store: S,
        catalog: Arc<dyn ProviderCatalog>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, RegistryError> {
        let state = RegistryState::from_entries(store.load()?)?;
        tracing::info!(entries = state.entries.len(), "registry loaded");
        Ok(Self {
            store,
            catalog,
            clock,
            state: RwLock::new(state),
        })
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Copy of every entry in insertion order.
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        self.state.read().entries.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&self, state: &RegistryState) -> Result<(), RegistryError> {
        self.store.save(&state.entries).map_err(|err| {
            tracing::error!(error = %err, "failed to persist registry");
            RegistryError::Persistence(err)
        })
    }

    /// Insert a new entry. The caller has already validated everything except
    /// uniqueness.
    fn insert(&self, entry: RegistryEntry) -> Result<RegistryEntry, RegistryError> {
        let mut state = self.state.write();
        if state.index.contains_key(&entry.npi) {
            return Err(RegistryError::DuplicateIdentifier { npi: entry.npi });
        }

        let position = state.entries.len();
        state.index.insert(entry.npi.clone(), position);
        state.entries.push(entry.clone());

        if let Err(err) = self.persist(&state) {
            state.entries.pop();
            state.index.remove(&entry.npi);
            return Err(err);
        }

        tracing::info!(npi = %entry.npi, entity_type = ?entry.entity_type(), "registered entity");
        Ok(entry)
    }

    /// Apply `change` to an existing entry, stamp it, and persist.
    ///
    /// The entry is restored if `change` or the write fails.
    fn mutate<F>(&self, npi: &str, change: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut RegistryEntry) -> Result<(), RegistryError>,
    {
        let mut state = self.state.write();
        let position = state.position(npi)?;
        let original = state.entries[position].clone();

        let result = change(&mut state.entries[position]).and_then(|()| {
            state.entries[position].last_updated = self.clock.now();
            self.persist(&state)
        });

        if result.is_err() {
            state.entries[position] = original;
        }
        result
    }

    fn check_identifier(npi: &str) -> Result<(), RegistryError> {
        if validate_npi(npi) {
            Ok(())
        } else {
            Err(RegistryError::InvalidIdentifier { npi: npi.into() })
        }
    }

    fn check_provider_types(&self, provider_types: &[String]) -> Result<(), RegistryError> {
        match provider_types.iter().find(|t| !self.catalog.type_exists(t)) {
            Some(unknown) => Err(RegistryError::UnknownProviderType {
                provider_type: unknown.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_not_registered(&self, npi: &str) -> Result<(), RegistryError> {
        if self.state.read().index.contains_key(npi) {
            Err(RegistryError::DuplicateIdentifier { npi: npi.into() })
        } else {
            Ok(())
        }
    }
}

impl<S: RegistryStore> RegistryApi for Registry<S> {
    fn register_provider(
        &self,
        registration: ProviderRegistration,
    ) -> Result<RegistryEntry, RegistryError> {
        Self::check_identifier(&registration.npi)?;
        // Reported before a type error; re-checked under the write lock.
        self.check_not_registered(&registration.npi)?;
        self.check_provider_types(&registration.provider_types)?;

        let now = self.clock.now();
        let entry = RegistryEntry {
            npi: registration.npi,
            kind: EntityKind::Individual(IndividualProfile {
                provider_types: registration.provider_types,
                degrees: registration.degrees,
                specialty: registration.specialty,
                subspecialty: registration.subspecialty,
                affiliations: registration.affiliations,
            }),
            name: registration.name,
            credential_status: CredentialStatus::Pending,
            credentials: registration
                .credentials
                .into_iter()
                .map(NewCredential::self_attested)
                .collect(),
            registered_at: now,
            last_updated: now,
            registry_version: REGISTRY_VERSION.into(),
        };
        self.insert(entry)
    }

    fn register_organization(
        &self,
        registration: OrganizationRegistration,
    ) -> Result<RegistryEntry, RegistryError> {
        Self::check_identifier(&registration.npi)?;

        let now = self.clock.now();
        let entry = RegistryEntry {
            npi: registration.npi,
            kind: EntityKind::Organization(OrganizationProfile {
                organization_name: Some(registration.organization_name),
                neuron_endpoint: Some(registration.endpoint),
            }),
            name: registration.name,
            credential_status: CredentialStatus::Pending,
            credentials: registration
                .credentials
                .into_iter()
                .map(NewCredential::self_attested)
                .collect(),
            registered_at: now,
            last_updated: now,
            registry_version: REGISTRY_VERSION.into(),
        };
        self.insert(entry)
    }

    fn find(&self, npi: &str) -> Option<RegistryEntry> {
        self.state.read().get(npi).cloned()
    }

    fn add_credential(&self, npi: &str, credential: NewCredential) -> Result<(), RegistryError> {
        self.mutate(npi, |entry| {
            entry.credentials.push(credential.self_attested());
            Ok(())
        })?;
        tracing::debug!(npi, "credential added");
        Ok(())
    }

    fn update_credential_status(
        &self,
        npi: &str,
        credential_identifier: &str,
        status: CredentialStatus,
    ) -> Result<(), RegistryError> {
        self.mutate(npi, |entry| {
            let credential = entry
                .credentials
                .iter_mut()
                .find(|c| c.identifier == credential_identifier)
                .ok_or_else(|| RegistryError::CredentialNotFound {
                    npi: npi.into(),
                    identifier: credential_identifier.into(),
                })?;
            credential.status = status;
            Ok(())
        })?;
        tracing::debug!(npi, credential = credential_identifier, %status, "credential status changed");
        Ok(())
    }

    fn update_endpoint(&self, npi: &str, endpoint: NeuronEndpoint) -> Result<(), RegistryError> {
        self.mutate(npi, |entry| match &mut entry.kind {
            EntityKind::Organization(profile) => {
                profile.neuron_endpoint = Some(endpoint);
                Ok(())
            }
            EntityKind::Individual(_) => Err(RegistryError::NotAnOrganization { npi: npi.into() }),
        })?;
        tracing::debug!(npi, "endpoint updated");
        Ok(())
    }

    fn update_entity_status(
        &self,
        npi: &str,
        status: CredentialStatus,
    ) -> Result<(), RegistryError> {
        self.mutate(npi, |entry| {
            entry.credential_status = status;
            Ok(())
        })?;
        tracing::info!(npi, %status, "entity status changed");
        Ok(())
    }

    fn record_heartbeat(
        &self,
        npi: &str,
        health_status: HealthStatus,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();
        self.mutate(npi, |entry| match &mut entry.kind {
            EntityKind::Organization(profile) => {
                let endpoint = profile
                    .neuron_endpoint
                    .as_mut()
                    .ok_or_else(|| RegistryError::EndpointNotFound { npi: npi.into() })?;
                endpoint.health_status = health_status;
                endpoint.last_heartbeat = Some(now);
                Ok(())
            }
            EntityKind::Individual(_) => Err(RegistryError::NotAnOrganization { npi: npi.into() }),
        })?;
        tracing::debug!(npi, ?health_status, "heartbeat recorded");
        Ok(())
    }

    fn search(&self, query: &SearchQuery) -> Vec<RegistryEntry> {
        query.apply(&self.state.read().entries)
    }
}
