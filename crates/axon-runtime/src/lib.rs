//! # Axon Runtime
//!
//! Builds a working broker from one data directory.
//!
//! ## Layout
//!
//! | File | Owner |
//! |------|-------|
//! | `registry.json` | [`Registry`] (atomic rewrite on every mutation) |
//! | `audit.jsonl` | [`AuditLog`] (append-only) |
//! | `LOCK` | [`DataDirLock`] (held while the runtime lives) |
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Create the data directory and take the lock
//! 3. Load the provider catalog
//! 4. Load the registry and recover the audit chain head
//! 5. Construct the broker over both
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axon_runtime::{init_logging, AxonRuntime, RuntimeConfig};
//! use axon_broker::ConnectionBrokerApi;
//!
//! let config = RuntimeConfig::from_env()?;
//! init_logging(&config)?;
//! let runtime = AxonRuntime::open(config)?;
//! let outcome = runtime.broker().connect(&message, &patient_public_key)?;
//! ```

pub mod config;
pub mod lock;
pub mod telemetry;

pub use config::{ConfigError, RuntimeConfig};
pub use lock::{DataDirLock, LockError};
pub use telemetry::{init_logging, TelemetryError};

use axon_audit::{AuditError, AuditLog};
use axon_broker::ConnectionBroker;
use axon_registry::{
    CatalogError, JsonFileStore, ProviderCatalog, Registry, RegistryError, StaticCatalog,
};
use axon_types::{SystemTimeSource, TimeSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const REGISTRY_FILE: &str = "registry.json";
pub const AUDIT_FILE: &str = "audit.jsonl";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Registry, audit log, and broker sharing one locked data directory.
pub struct AxonRuntime {
    config: RuntimeConfig,
    registry: Arc<Registry<JsonFileStore>>,
    audit: Arc<AuditLog>,
    broker: ConnectionBroker,
    _lock: DataDirLock,
}

impl AxonRuntime {
    pub fn open(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    /// Open with every component reading time from `clock`.
    pub fn with_clock(
        config: RuntimeConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        std::fs::create_dir_all(&config.data_dir).map_err(|e| RuntimeError::DataDir {
            path: config.data_dir.clone(),
            message: e.to_string(),
        })?;
        let lock = DataDirLock::acquire(&config.data_dir)?;

        let catalog = load_catalog(config.catalog_path.as_deref())?;
        let registry = Arc::new(Registry::new(
            JsonFileStore::new(config.data_dir.join(REGISTRY_FILE)),
            catalog,
            clock.clone(),
        )?);
        let audit = Arc::new(AuditLog::with_clock(
            config.data_dir.join(AUDIT_FILE),
            clock.clone(),
        )?);
        let broker = ConnectionBroker::with_clock(
            registry.clone(),
            audit.clone(),
            config.broker(),
            clock,
        );

        tracing::info!(
            data_dir = %config.data_dir.display(),
            entries = registry.len(),
            replay_window_secs = config.replay_window_secs,
            "axon runtime started"
        );

        Ok(Self {
            config,
            registry,
            audit,
            broker,
            _lock: lock,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry<JsonFileStore> {
        &self.registry
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn broker(&self) -> &ConnectionBroker {
        &self.broker
    }

    pub fn registry_path(&self) -> PathBuf {
        self.config.data_dir.join(REGISTRY_FILE)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.config.data_dir.join(AUDIT_FILE)
    }
}

/// The catalog at `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Arc<dyn ProviderCatalog>, CatalogError> {
    let catalog = match path {
        Some(path) => StaticCatalog::from_json_file(path)?,
        None => StaticCatalog::builtin(),
    };
    Ok(Arc::new(catalog))
}
