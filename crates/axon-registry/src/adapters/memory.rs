//! # In-Memory Store
//!
//! Keeps the last saved document in memory. Saves can be made to fail so
//! rollback paths are testable.

use crate::domain::entities::RegistryEntry;
use crate::domain::errors::StoreError;
use crate::ports::outbound::RegistryStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<Vec<RegistryEntry>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that loads `entries`.
    pub fn with_entries(entries: Vec<RegistryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last saved document.
    pub fn saved(&self) -> Vec<RegistryEntry> {
        self.entries.lock().clone()
    }
}

impl RegistryStore for InMemoryStore {
    fn load(&self) -> Result<Vec<RegistryEntry>, StoreError> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entries: &[RegistryEntry]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "<memory>".into(),
                message: "simulated write failure".into(),
            });
        }
        *self.entries.lock() = entries.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
