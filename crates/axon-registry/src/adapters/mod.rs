//! # Adapters Module
//!
//! - `file`: atomic JSON document store
//! - `memory`: in-memory store for tests and embedding
//! - `catalog`: immutable provider-type and action index

pub mod catalog;
pub mod file;
pub mod memory;

pub use catalog::StaticCatalog;
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
