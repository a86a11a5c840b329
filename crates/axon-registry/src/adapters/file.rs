//! # JSON File Store
//!
//! The registry lives in one pretty-printed JSON document:
//!
//! ```text
//! { "version": "1.0.0", "entries": { "<npi>": RegistryEntry, ... } }
//! ```
//!
//! Entries are written and read back in insertion order. Every save writes a
//! `.registry-<uuid>.tmp` file next to the target, syncs it, and renames it
//! over the target, so readers never observe a partial document.

use crate::domain::entities::{RegistryEntry, REGISTRY_VERSION};
use crate::domain::errors::StoreError;
use crate::domain::npi::validate_npi;
use crate::ports::outbound::RegistryStore;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File-backed registry store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let temp_path = dir.join(format!(".registry-{}.tmp", uuid::Uuid::new_v4()));
        let result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, &self.path)
        })();

        if let Err(err) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(self.io_error(err));
        }
        Ok(())
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<RegistryEntry>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no registry file, starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let document: StoredDocument =
            serde_json::from_str(&raw).map_err(|e| self.corrupt(e.to_string()))?;

        let mut seen = HashSet::with_capacity(document.entries.0.len());
        let mut entries = Vec::with_capacity(document.entries.0.len());
        for (key, entry) in document.entries.0 {
            if key != entry.npi {
                return Err(self.corrupt(format!(
                    "entry keyed \"{key}\" carries NPI \"{}\"",
                    entry.npi
                )));
            }
            if !validate_npi(&key) {
                return Err(self.corrupt(format!("entry \"{key}\" has an invalid NPI")));
            }
            if !seen.insert(key.clone()) {
                return Err(self.corrupt(format!("entry \"{key}\" appears twice")));
            }
            entries.push(entry);
        }

        tracing::debug!(
            path = %self.path.display(),
            version = %document.version,
            entries = entries.len(),
            "loaded registry"
        );
        Ok(entries)
    }

    fn save(&self, entries: &[RegistryEntry]) -> Result<(), StoreError> {
        let document = DocumentRef {
            version: REGISTRY_VERSION,
            entries: EntriesRef(entries),
        };
        let bytes = serde_json::to_vec_pretty(&document).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;
        self.write_atomically(&bytes)
    }
}

// =============================================================================
// DOCUMENT FORMAT
// =============================================================================

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: &'a str,
    entries: EntriesRef<'a>,
}

/// Serializes entries as a JSON object keyed by NPI, in slice order.
struct EntriesRef<'a>(&'a [RegistryEntry]);

impl Serialize for EntriesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.npi, entry)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct StoredDocument {
    version: String,
    entries: OrderedEntries,
}

/// A JSON object read back as key/value pairs in document order.
struct OrderedEntries(Vec<(String, RegistryEntry)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of NPI to registry entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, entry)) = access.next_entry::<String, RegistryEntry>()? {
                    pairs.push((key, entry));
                }
                Ok(OrderedEntries(pairs))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
