//! # Audit Log
//!
//! One JSON entry per line, appended and synced before `append` returns.
//!
//! The chain head (`last_hash`) lives in memory behind the same mutex as the
//! file handle. On open it is recovered from the last non-blank line so the
//! chain continues across restarts.
//!
//! ## Failed Appends
//!
//! A write or sync error truncates the file back to its length before the
//! append, so neither a partial line nor an unacknowledged entry stays on
//! disk. If that truncation also fails the log is poisoned and every later
//! append returns [`AuditError::Poisoned`].

use crate::chain::{compute_hash, verify_chain, ChainVerification, GENESIS_HASH};
use crate::entry::{AuditDetails, AuditEntry, AuditEventType, AuditRecord};
use crate::errors::AuditError;
use axon_types::{format_timestamp, SystemTimeSource, TimeSource};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Append target of the log.
trait LogFile: Send {
    fn len(&self) -> io::Result<u64>;
    fn append_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn len(&self) -> io::Result<u64> {
        self.metadata().map(|m| m.len())
    }

    fn append_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(self, bytes)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_data()
    }
}

struct ChainHead {
    file: Box<dyn LogFile>,
    last_hash: String,
    poisoned: bool,
}

/// Append-only, hash-chained audit log.
pub struct AuditLog {
    path: PathBuf,
    clock: Arc<dyn TimeSource>,
    head: Mutex<ChainHead>,
}

impl AuditLog {
    /// Open (creating if needed) the log at `path` using the system clock.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        Self::with_clock(path, Arc::new(SystemTimeSource))
    }

    pub fn with_clock<P: AsRef<Path>>(
        path: P,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuditError::io(&path, e))?;
        }

        let last_hash = recover_last_hash(&path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AuditError::io(&path, e))?;

        tracing::debug!(
            path = %path.display(),
            genesis = last_hash == GENESIS_HASH,
            "audit log opened"
        );

        Ok(Self::from_parts(path, clock, Box::new(file), last_hash))
    }

    fn from_parts(
        path: PathBuf,
        clock: Arc<dyn TimeSource>,
        file: Box<dyn LogFile>,
        last_hash: String,
    ) -> Self {
        Self {
            path,
            clock,
            head: Mutex::new(ChainHead {
                file,
                last_hash,
                poisoned: false,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash of the most recent entry, or the genesis value.
    pub fn last_hash(&self) -> String {
        self.head.lock().last_hash.clone()
    }

    /// Whether a failed append could not be rolled back.
    pub fn is_poisoned(&self) -> bool {
        self.head.lock().poisoned
    }

    /// Append one event and return the written entry.
    ///
    /// The chain head only advances once the line is written and synced. On
    /// failure the file is cut back to where it stood before the call.
    pub fn append(
        &self,
        event_type: AuditEventType,
        connection_id: &str,
        details: AuditDetails,
    ) -> Result<AuditEntry, AuditError> {
        let mut head = self.head.lock();
        if head.poisoned {
            return Err(AuditError::Poisoned {
                path: self.path.display().to_string(),
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        let timestamp = format_timestamp(self.clock.now());
        let hash = compute_hash(&AuditRecord {
            id: &id,
            timestamp: &timestamp,
            event_type,
            connection_id,
            details: &details,
            prev_hash: &head.last_hash,
        })?;

        let entry = AuditEntry {
            id,
            timestamp,
            event_type,
            connection_id: connection_id.to_string(),
            details,
            prev_hash: head.last_hash.clone(),
            hash,
        };

        let mut line = serde_json::to_vec(&entry).map_err(|e| AuditError::Serialization {
            message: e.to_string(),
        })?;
        line.push(b'\n');

        let start = head.file.len().map_err(|e| AuditError::io(&self.path, e))?;
        let written = head
            .file
            .append_bytes(&line)
            .and_then(|()| head.file.sync());
        if let Err(err) = written {
            tracing::error!(path = %self.path.display(), error = %err, "audit append failed");
            if let Err(rollback) = head.file.truncate(start) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "audit rollback failed, log poisoned"
                );
                head.poisoned = true;
            }
            return Err(AuditError::io(&self.path, err));
        }

        head.last_hash = entry.hash.clone();
        Ok(entry)
    }

    /// Verify this log's file. Appends wait until verification finishes.
    pub fn verify(&self) -> Result<ChainVerification, AuditError> {
        let _head = self.head.lock();
        verify_chain(&self.path)
    }
}

fn recover_last_hash(path: &Path) -> Result<String, AuditError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(GENESIS_HASH.to_string());
        }
        Err(err) => return Err(AuditError::io(path, err)),
    };

    let mut last_line = None;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| AuditError::io(path, e))?;
        if !line.trim().is_empty() {
            last_line = Some(line);
        }
    }

    let Some(last_line) = last_line else {
        return Ok(GENESIS_HASH.to_string());
    };
    let entry: AuditEntry =
        serde_json::from_str(&last_line).map_err(|e| AuditError::CorruptTail {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(entry.hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_types::ManualTimeSource;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use sha2::{Digest, Sha256};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    fn details(pairs: &[(&str, &str)]) -> AuditDetails {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect()
    }

    // =========================================================================
    // FAULT INJECTION
    // =========================================================================

    /// Switches that make the next write, sync, or truncate fail.
    #[derive(Clone, Default)]
    struct Faults {
        partial_write: Arc<AtomicBool>,
        sync: Arc<AtomicBool>,
        truncate: Arc<AtomicBool>,
    }

    impl Faults {
        fn clear(&self) {
            self.partial_write.store(false, Ordering::SeqCst);
            self.sync.store(false, Ordering::SeqCst);
            self.truncate.store(false, Ordering::SeqCst);
        }
    }

    struct FlakyFile {
        file: File,
        faults: Faults,
    }

    fn injected(what: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, format!("injected {what} failure"))
    }

    impl LogFile for FlakyFile {
        fn len(&self) -> io::Result<u64> {
            LogFile::len(&self.file)
        }

        fn append_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
            if self.faults.partial_write.load(Ordering::SeqCst) {
                self.file.append_bytes(&bytes[..bytes.len() / 2])?;
                return Err(injected("write"));
            }
            self.file.append_bytes(bytes)
        }

        fn sync(&mut self) -> io::Result<()> {
            if self.faults.sync.load(Ordering::SeqCst) {
                return Err(injected("sync"));
            }
            LogFile::sync(&mut self.file)
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            if self.faults.truncate.load(Ordering::SeqCst) {
                return Err(injected("truncate"));
            }
            LogFile::truncate(&mut self.file, len)
        }
    }

    fn flaky_log(path: &Path) -> (AuditLog, Faults) {
        let faults = Faults::default();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        let log = AuditLog::from_parts(
            path.to_path_buf(),
            Arc::new(SystemTimeSource),
            Box::new(FlakyFile {
                file,
                faults: faults.clone(),
            }),
            GENESIS_HASH.to_string(),
        );
        (log, faults)
    }

    fn attempt(log: &AuditLog, connection_id: &str) -> Result<AuditEntry, AuditError> {
        log.append(
            AuditEventType::ConnectAttempt,
            connection_id,
            AuditDetails::new(),
        )
    }

    #[test]
    fn test_failed_sync_leaves_no_entry_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let (log, faults) = flaky_log(&path);

        let first = attempt(&log, "a").unwrap();
        faults.sync.store(true, Ordering::SeqCst);
        assert!(matches!(attempt(&log, "b"), Err(AuditError::Io { .. })));
        assert_eq!(read_entries(&path), vec![first.clone()]);
        assert_eq!(log.last_hash(), first.hash);

        faults.clear();
        let next = attempt(&log, "c").unwrap();
        assert_eq!(next.prev_hash, first.hash);
        assert_eq!(
            verify_chain(&path).unwrap(),
            ChainVerification {
                valid: true,
                entries: 2,
                broken_at: None
            }
        );
        assert!(!log.is_poisoned());
    }

    #[test]
    fn test_partial_write_is_cut_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let (log, faults) = flaky_log(&path);

        let first = attempt(&log, "a").unwrap();
        let before = std::fs::read(&path).unwrap();
        faults.partial_write.store(true, Ordering::SeqCst);
        assert!(attempt(&log, "b").is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);

        faults.clear();
        attempt(&log, "c").unwrap();
        let result = verify_chain(&path).unwrap();
        assert!(result.valid);
        assert_eq!(result.entries, 2);
        assert_eq!(read_entries(&path)[0], first);
    }

    #[test]
    fn test_failed_rollback_poisons_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let (log, faults) = flaky_log(&path);

        attempt(&log, "a").unwrap();
        faults.partial_write.store(true, Ordering::SeqCst);
        faults.truncate.store(true, Ordering::SeqCst);
        assert!(matches!(attempt(&log, "b"), Err(AuditError::Io { .. })));
        assert!(log.is_poisoned());

        faults.clear();
        assert!(matches!(
            attempt(&log, "c"),
            Err(AuditError::Poisoned { .. })
        ));
    }

    // =========================================================================
    // APPEND AND RECOVERY
    // =========================================================================

    #[test]
    fn test_granted_details_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = AuditLog::open(&path).unwrap();

        let entry = log
            .append(
                AuditEventType::ConnectGranted,
                "conn-1",
                details(&[
                    ("provider_npi", "1679576722"),
                    ("neuron_endpoint", "https://n.example"),
                ]),
            )
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let line = written.trim_end();
        assert!(line.contains(
            r#""details":{"provider_npi":"1679576722","neuron_endpoint":"https://n.example"}"#
        ));
        let record = line.replace(&format!(r#","hash":"{}""#, entry.hash), "");
        assert_eq!(entry.hash, hex::encode(Sha256::digest(record.as_bytes())));
    }

    fn read_entries(path: &Path) -> Vec<AuditEntry> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_first_entry_links_to_genesis() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path().join("audit.jsonl")).unwrap();
        assert_eq!(log.last_hash(), GENESIS_HASH);

        let entry = log
            .append(AuditEventType::ConnectAttempt, "conn-1", AuditDetails::new())
            .unwrap();

        assert_eq!(entry.prev_hash, GENESIS_HASH);
        assert_eq!(entry.hash, compute_hash(&entry.record()).unwrap());
        assert_eq!(log.last_hash(), entry.hash);
        assert!(entry.details.is_empty());
    }

    #[test]
    fn test_entries_link_and_persist_one_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = AuditLog::open(&path).unwrap();

        let first = log
            .append(
                AuditEventType::ConnectAttempt,
                "conn-1",
                details(&[("patient_agent_id", "agent-1"), ("provider_npi", "1679576722")]),
            )
            .unwrap();
        let second = log
            .append(
                AuditEventType::ConnectDenied,
                "conn-1",
                details(&[("code", "PROVIDER_NOT_FOUND")]),
            )
            .unwrap();

        assert_eq!(second.prev_hash, first.hash);
        assert_ne!(first.id, second.id);
        assert_eq!(read_entries(&path), vec![first, second]);
        assert_eq!(
            log.verify().unwrap(),
            ChainVerification {
                valid: true,
                entries: 2,
                broken_at: None
            }
        );
    }

    #[test]
    fn test_timestamp_comes_from_clock() {
        let dir = TempDir::new().unwrap();
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let log = AuditLog::with_clock(
            dir.path().join("audit.jsonl"),
            Arc::new(ManualTimeSource::new(at)),
        )
        .unwrap();

        let entry = log
            .append(AuditEventType::ConnectGranted, "conn-9", AuditDetails::new())
            .unwrap();
        assert_eq!(entry.timestamp, "2026-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_restart_continues_chain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");

        let last = {
            let log = AuditLog::open(&path).unwrap();
            log.append(AuditEventType::ConnectAttempt, "a", AuditDetails::new())
                .unwrap();
            log.append(AuditEventType::ConnectGranted, "a", AuditDetails::new())
                .unwrap()
        };

        let reopened = AuditLog::open(&path).unwrap();
        assert_eq!(reopened.last_hash(), last.hash);
        let next = reopened
            .append(AuditEventType::ConnectAttempt, "b", AuditDetails::new())
            .unwrap();
        assert_eq!(next.prev_hash, last.hash);
        assert_eq!(verify_chain(&path).unwrap().entries, 3);
        assert!(verify_chain(&path).unwrap().valid);
    }

    #[test]
    fn test_trailing_blank_lines_ignored_on_recovery() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let last = AuditLog::open(&path)
            .unwrap()
            .append(AuditEventType::ConnectAttempt, "a", AuditDetails::new())
            .unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\n   \n").unwrap();

        assert_eq!(AuditLog::open(&path).unwrap().last_hash(), last.hash);
    }

    #[test]
    fn test_corrupt_tail_refuses_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        std::fs::write(&path, "{\"truncated\n").unwrap();

        assert!(matches!(
            AuditLog::open(&path),
            Err(AuditError::CorruptTail { .. })
        ));
    }

    #[test]
    fn test_concurrent_appends_keep_chain_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = Arc::new(AuditLog::open(&path).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(
                            AuditEventType::ConnectAttempt,
                            &format!("conn-{t}-{i}"),
                            AuditDetails::new(),
                        )
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let result = verify_chain(&path).unwrap();
        assert!(result.valid);
        assert_eq!(result.entries, 100);
    }

    /// Replace the hex digit at `offset` within `field` on one line.
    fn flip_hex(line: &str, field: &str, offset: usize) -> String {
        let marker = format!("\"{field}\":\"");
        let start = line.find(&marker).unwrap() + marker.len() + offset;
        let original = line.as_bytes()[start];
        let replacement = if original == b'0' { '1' } else { '0' };
        let mut out = line.to_string();
        out.replace_range(start..start + 1, &replacement.to_string());
        out
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_appends_verify(count in 0usize..12) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("audit.jsonl");
            let log = AuditLog::open(&path).unwrap();
            for i in 0..count {
                log.append(AuditEventType::ConnectAttempt, &format!("c{i}"), AuditDetails::new()).unwrap();
            }
            let result = verify_chain(&path).unwrap();
            prop_assert!(result.valid);
            prop_assert_eq!(result.entries, count);
        }

        #[test]
        fn prop_tampered_hash_is_located(
            count in 1usize..8,
            target in any::<prop::sample::Index>(),
            offset in 0usize..64,
            tamper_prev in any::<bool>(),
        ) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("audit.jsonl");
            let log = AuditLog::open(&path).unwrap();
            for i in 0..count {
                log.append(AuditEventType::ConnectDenied, &format!("c{i}"), AuditDetails::new()).unwrap();
            }

            let mut lines: Vec<String> = std::fs::read_to_string(&path)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect();
            let index = target.index(count);
            let field = if tamper_prev { "prev_hash" } else { "hash" };
            lines[index] = flip_hex(&lines[index], field, offset);
            std::fs::write(&path, lines.join("\n") + "\n").unwrap();

            let result = verify_chain(&path).unwrap();
            prop_assert!(!result.valid);
            prop_assert_eq!(result.entries, count);
            prop_assert_eq!(result.broken_at, Some(index));
        }
    }
}
