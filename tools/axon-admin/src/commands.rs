//! Command implementations. Each returns a [`Report`] for `main` to print.

use anyhow::{bail, Context, Result};
use axon_audit::verify_chain;
use axon_broker::seal;
use axon_identity::{generate_keypair, generate_nonce};
use axon_registry::{
    validate_npi, CredentialStatus, JsonFileStore, Registry, RegistryApi, SearchQuery,
};
use axon_runtime::{
    init_logging, load_catalog, AxonRuntime, RuntimeConfig, AUDIT_FILE, REGISTRY_FILE,
};
use axon_types::SystemTimeSource;
use std::path::Path;
use std::sync::Arc;

/// Text to print and whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub success: bool,
}

impl Report {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: false,
        }
    }

    fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::ok(serde_json::to_string_pretty(value)?))
    }
}

pub fn keygen() -> Result<Report> {
    let keypair = generate_keypair();
    Report::json(&serde_json::json!({
        "public_key": keypair.public_key,
        "private_key": keypair.private_key,
    }))
}

pub fn nonce(bytes: usize) -> Result<Report> {
    if bytes == 0 {
        bail!("nonce size must be at least one byte");
    }
    Ok(Report::ok(generate_nonce(bytes)))
}

pub fn validate_identifier(npi: &str) -> Report {
    if validate_npi(npi) {
        Report::ok(format!("{npi}: valid"))
    } else {
        Report::failed(format!("{npi}: invalid"))
    }
}

pub fn verify_audit(path: &Path) -> Result<Report> {
    let result = verify_chain(path)
        .with_context(|| format!("reading audit log {}", path.display()))?;
    let mut report = Report::json(&result)?;
    report.success = result.valid;
    Ok(report)
}

/// Open the registry file read-only with the configured catalog.
fn open_registry(config: &RuntimeConfig) -> Result<Registry<JsonFileStore>> {
    let catalog = load_catalog(config.catalog_path.as_deref()).context("loading catalog")?;
    let path = config.data_dir.join(REGISTRY_FILE);
    Registry::new(JsonFileStore::new(&path), catalog, Arc::new(SystemTimeSource))
        .with_context(|| format!("loading registry {}", path.display()))
}

pub fn find(config: &RuntimeConfig, npi: &str) -> Result<Report> {
    match open_registry(config)?.find(npi) {
        Some(entry) => Report::json(&entry),
        None => Ok(Report::failed(format!("{npi}: not registered"))),
    }
}

pub fn search(config: &RuntimeConfig, query: &SearchQuery) -> Result<Report> {
    let results = open_registry(config)?.search(query);
    Report::json(&results)
}

pub fn set_status(config: RuntimeConfig, npi: &str, status: CredentialStatus) -> Result<Report> {
    let runtime = AxonRuntime::open(config).context("opening data directory")?;
    runtime
        .registry()
        .update_entity_status(npi, status)
        .with_context(|| format!("setting status of {npi}"))?;
    Ok(Report::ok(format!("{npi}: {status}")))
}

pub fn sign(payload: &str, private_key: &str, public_key: &str) -> Result<Report> {
    let message = seal(payload.as_bytes(), private_key, public_key).context("signing payload")?;
    Report::json(&message)
}

/// Install logging for the command. A setup failure comes back as a warning
/// for stderr; the command still runs.
pub fn start_logging(config: &RuntimeConfig) -> Option<String> {
    init_logging(config)
        .err()
        .map(|err| format!("warning: logging disabled: {err}"))
}

/// Default audit log location for `config`.
pub fn audit_path(config: &RuntimeConfig) -> std::path::PathBuf {
    config.data_dir.join(AUDIT_FILE)
}
