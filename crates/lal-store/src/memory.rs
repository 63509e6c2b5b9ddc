use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::scan::{snapshot_range, CursorGuard, RangeScan};
use crate::traits::LedgerStore;

/// In-memory, `BTreeMap`-based ledger store.
///
/// Intended for tests and embedding. Entries live behind a `RwLock`; values
/// are cloned on read and write. Range scans copy the matching entries under
/// the read lock, so no lock is held while the caller iterates.
pub struct InMemoryLedgerStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryLedgerStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of range scans handed out and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Sorted list of all keys.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.keys().cloned().collect())
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        map.insert(key.to_string(), value.to_vec());
        trace!(key, bytes = value.len(), "put");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.remove(key).is_some())
    }

    fn scan_range(&self, start: &str, end: &str) -> StoreResult<RangeScan<'_>> {
        let entries = {
            let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
            snapshot_range(&map, start, end)?
        };
        let guard = CursorGuard::open(&self.open_cursors);
        Ok(RangeScan::with_guard(entries.into_iter().map(Ok), guard))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedgerStore")
            .field("key_count", &self.len())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}
