//! # Domain Errors
//!
//! Registry errors propagate to the caller unchanged. The transport decides
//! which status code each one maps to.

use thiserror::Error;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Identifier is not ten digits with a valid check digit.
    #[error("Invalid NPI: \"{npi}\"")]
    InvalidIdentifier { npi: String },

    /// Identifier is already registered.
    #[error("NPI \"{npi}\" is already registered")]
    DuplicateIdentifier { npi: String },

    /// Provider type tag unknown to the catalog.
    #[error("Invalid provider type: \"{provider_type}\" is not in the taxonomy")]
    UnknownProviderType { provider_type: String },

    /// No entry with this identifier.
    #[error("NPI \"{npi}\" not found")]
    NotFound { npi: String },

    /// Entry exists but has no credential with this identifier.
    #[error("Credential \"{identifier}\" not found for NPI \"{npi}\"")]
    CredentialNotFound { npi: String, identifier: String },

    /// Organization entry exists but has no endpoint to update.
    #[error("NPI \"{npi}\" has no neuron endpoint")]
    EndpointNotFound { npi: String },

    /// Endpoint operations are only valid for organizations.
    #[error("NPI \"{npi}\" is not an organization entry")]
    NotAnOrganization { npi: String },

    /// The change could not be written; in-memory state was rolled back.
    #[error("Registry persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Errors from a registry store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Registry file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Errors loading a provider catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("I/O error reading catalog {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid catalog {path}: {message}")]
    Parse { path: String, message: String },
}
