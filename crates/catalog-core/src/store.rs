//! Item collection storage
//!
//! The collection is always read and written whole. There is no locking
//! around the backing file: two writers doing read-modify-write at the same
//! time can lose one of the updates.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{CatalogError, Result};
use crate::item::Item;

/// Whole-collection read/write access
pub trait ItemStore: Send + Sync {
    /// Load every item in insertion order
    fn read_all(&self) -> Result<Vec<Item>>;

    /// Replace the stored collection with `items`
    fn write_all(&self, items: &[Item]) -> Result<()>;
}

/// Collection persisted as a pretty-printed JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<Item>> {
        let raw = fs::read_to_string(&self.path)?;
        let items: Vec<Item> = serde_json::from_str(&raw)?;
        tracing::trace!(count = items.len(), path = %self.path.display(), "Read items");
        Ok(items)
    }

    fn write_all(&self, items: &[Item]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, json)?;
        tracing::debug!(count = items.len(), path = %self.path.display(), "Wrote items");
        Ok(())
    }
}

/// In-memory collection, mainly for tests and demos.
///
/// Reads and writes can be made to fail on demand, and every successful write
/// is recorded so callers can check what was persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<Item>>,
    writes: Mutex<Vec<Vec<Item>>>,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    /// Make subsequent reads fail (or succeed again)
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of read attempts so far, failed ones included
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Every collection passed to a successful `write_all`, oldest first
    pub fn writes(&self) -> Vec<Vec<Item>> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current contents
    pub fn snapshot(&self) -> Vec<Item> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ItemStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<Item>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CatalogError::Storage("File read error".to_string()));
        }
        Ok(self.snapshot())
    }

    fn write_all(&self, items: &[Item]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CatalogError::Storage("Write failed".to_string()));
        }
        *self.items.lock().unwrap_or_else(PoisonError::into_inner) = items.to_vec();
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(items.to_vec());
        Ok(())
    }
}
