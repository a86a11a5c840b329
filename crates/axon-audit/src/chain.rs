//! # Hash Chain
//!
//! Hashing of audit records and verification of a whole log file.

use crate::entry::{AuditEntry, AuditRecord};
use crate::errors::AuditError;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// `prev_hash` of the first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Lowercase hex SHA-256 of the canonical JSON of `record`.
pub fn compute_hash(record: &AuditRecord<'_>) -> Result<String, AuditError> {
    let canonical = serde_json::to_vec(record).map_err(|e| AuditError::Serialization {
        message: e.to_string(),
    })?;
    Ok(digest(&canonical))
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash of a written line: its own fields in their written order, minus
/// `hash`. Lines from other writers verify as long as they hashed the same
/// compact JSON.
fn hash_as_written(line: &str) -> Option<String> {
    let fields: Map<String, Value> = serde_json::from_str(line).ok()?;
    let record: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| key != "hash")
        .collect();
    serde_json::to_vec(&record).ok().map(|bytes| digest(&bytes))
}

/// Outcome of [`verify_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    pub valid: bool,
    /// Non-blank lines in the file.
    pub entries: usize,
    /// Index (among non-blank lines) of the first broken link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_at: Option<usize>,
}

impl ChainVerification {
    fn intact(entries: usize) -> Self {
        Self {
            valid: true,
            entries,
            broken_at: None,
        }
    }

    fn broken(entries: usize, at: usize) -> Self {
        Self {
            valid: false,
            entries,
            broken_at: Some(at),
        }
    }
}

/// Walk the log at `path` from genesis and report the first broken link.
///
/// A missing or empty file is a valid chain of zero entries. A line that does
/// not parse as an entry counts as broken at that line.
pub fn verify_chain<P: AsRef<Path>>(path: P) -> Result<ChainVerification, AuditError> {
    let path = path.as_ref();
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ChainVerification::intact(0));
        }
        Err(err) => return Err(AuditError::io(path, err)),
    };

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| AuditError::io(path, e))?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(verify_lines(&lines))
}

/// Verify already-split, non-blank lines.
pub fn verify_lines<S: AsRef<str>>(lines: &[S]) -> ChainVerification {
    let total = lines.len();
    let mut expected_prev_hash = GENESIS_HASH.to_string();

    for (index, line) in lines.iter().enumerate() {
        let Ok(entry) = serde_json::from_str::<AuditEntry>(line.as_ref()) else {
            return ChainVerification::broken(total, index);
        };

        if entry.prev_hash != expected_prev_hash {
            return ChainVerification::broken(total, index);
        }

        if hash_as_written(line.as_ref()).as_deref() != Some(entry.hash.as_str()) {
            return ChainVerification::broken(total, index);
        }

        expected_prev_hash = entry.hash;
    }

    ChainVerification::intact(total)
}
