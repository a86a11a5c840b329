//! # Axon Test Suite
//!
//! Cross-crate tests over a real, file-backed runtime.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs          # TestNode: runtime + manual clock + patient keys
//! └── scenarios/
//!     ├── end_to_end.rs   # Scenarios A-E
//!     └── properties.rs   # Determinism, replay, concurrency
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p axon-tests
//! cargo test -p axon-tests scenarios::properties::
//! ```

pub mod harness;
pub mod scenarios;
