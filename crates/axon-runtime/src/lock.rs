//! # Data Directory Lock
//!
//! Prevents two processes from rewriting the same registry file or
//! interleaving appends to the same audit log.
//!
//! An exclusive advisory lock (`fs2`: flock on Unix, LockFile on Windows) is
//! held on `<data_dir>/LOCK` for the life of [`DataDirLock`]. The file holds
//! the owner's PID for error messages.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to open lock file {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Data directory lock {} already held{}", .path.display(), held_by(.pid))]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("Failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

// =============================================================================
// DATA DIRECTORY LOCK
// =============================================================================

/// Exclusive lock on a data directory, released on drop.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl DataDirLock {
    pub const LOCK_FILE: &'static str = "LOCK";

    /// Take the lock without waiting.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        let path = data_dir.join(Self::LOCK_FILE);

        // Not truncated before locking, so a holder's PID survives a failed
        // attempt and can be reported.
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::CreateFailed {
                path: path.clone(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked {
                pid: read_pid(&path),
                path,
            });
        }

        let pid = std::process::id();
        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{pid}").map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;

        tracing::debug!(path = %path.display(), pid, "data directory locked");
        Ok(Self { file, path, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn held_by(pid: &Option<u32>) -> String {
    pid.map(|p| format!(" by process {p}")).unwrap_or_default()
}

fn read_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
