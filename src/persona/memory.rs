//! In-memory data store of a persona group.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::nfs_protocol::{DataName, DataTagValue};

/// Statistics about storage operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of items stored.
    pub items_stored: u64,
    /// Total number of items retrieved.
    pub items_retrieved: u64,
    /// Total bytes stored.
    pub bytes_stored: u64,
    /// Total bytes retrieved.
    pub bytes_retrieved: u64,
    /// Number of duplicate immutable writes.
    pub duplicates: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
}

/// Data held by name.
///
/// Immutable data is written once; a second write of the same name is a
/// duplicate. Other kinds are replaced on write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<DataName, Bytes>>,
    stats: RwLock<StorageStats>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under `name`.
    ///
    /// Returns `true` if the content was newly stored, `false` for a
    /// duplicate immutable write.
    pub fn put(&self, name: DataName, content: Bytes) -> bool {
        let size = content.len() as u64;
        {
            let mut items = self.items.write();
            if name.tag == DataTagValue::ImmutableData && items.contains_key(&name) {
                trace!("{name} already stored");
                self.stats.write().duplicates += 1;
                return false;
            }
            items.insert(name, content);
        }

        {
            let mut stats = self.stats.write();
            stats.items_stored += 1;
            stats.bytes_stored += size;
        }
        debug!("Stored {name} ({size} bytes)");
        true
    }

    /// Content stored under `name`.
    #[must_use]
    pub fn get(&self, name: &DataName) -> Option<Bytes> {
        let content = self.items.read().get(name).cloned();
        let mut stats = self.stats.write();
        match &content {
            Some(bytes) => {
                stats.items_retrieved += 1;
                stats.bytes_retrieved += bytes.len() as u64;
            }
            None => {
                trace!("{name} not found");
                stats.misses += 1;
            }
        }
        content
    }

    /// Whether `name` is stored.
    #[must_use]
    pub fn exists(&self, name: &DataName) -> bool {
        self.items.read().contains_key(name)
    }

    /// Remove `name`. Returns whether it was stored.
    pub fn delete(&self, name: &DataName) -> bool {
        self.items.write().remove(name).is_some()
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Snapshot of the statistics.
    #[must_use]
    pub fn stats(&self) -> StorageStats {
        self.stats.read().clone()
    }
}
