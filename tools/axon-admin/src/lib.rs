//! Axon-Admin: operator commands over an Axon data directory.
//!
//! Read-only commands (`find`, `search`, `verify-audit`) open files directly
//! and work while a broker holds the data-directory lock. `set-status` takes
//! the lock through [`axon_runtime::AxonRuntime`].

pub mod commands;

pub use commands::Report;
