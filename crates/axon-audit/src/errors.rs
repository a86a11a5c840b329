//! Audit error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("Audit I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The last line of an existing log could not be read back, so the chain
    /// cannot be continued.
    #[error("Audit log {path} has an unreadable tail: {reason}")]
    CorruptTail { path: String, reason: String },

    /// An append failed and the file could not be cut back, so the chain on
    /// disk no longer matches the in-memory head.
    #[error("Audit log {path} is poisoned by an unrecoverable append failure")]
    Poisoned { path: String },

    #[error("Audit serialization error: {message}")]
    Serialization { message: String },
}

impl AuditError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
