//! # Axon Audit
//!
//! Hash-chained audit log of connect attempts, grants, and denials.
//!
//! ## Chain Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | `prev_hash` | `hash` of the previous line, or 64 zeros for the first |
//! | `hash` | lowercase hex SHA-256 of the record serialized without `hash` |
//!
//! Appends serialize the record as compact JSON in a fixed field order (`id`,
//! `timestamp`, `event_type`, `connection_id`, `details`, `prev_hash`), with
//! `details` keys in the order the caller inserted them. Verification hashes
//! each line over its fields as written, so logs from any writer using the
//! same compact form verify.
//!
//! ## Content Discipline
//!
//! `details` holds identifiers, denial codes, and endpoint references only.
//! Callers must never put clinical content in it; the log does not check.

pub mod chain;
pub mod entry;
pub mod errors;
pub mod log;

pub use chain::{compute_hash, verify_chain, ChainVerification, GENESIS_HASH};
pub use entry::{AuditDetails, AuditEntry, AuditEventType};
pub use errors::AuditError;
pub use log::AuditLog;
