use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::scan::{snapshot_range, CursorGuard, RangeScan};
use crate::traits::LedgerStore;

/// Ledger store persisted as a single JSON snapshot file.
///
/// The file holds an object mapping each key to its base64-encoded value.
/// The whole map is loaded on [`open`](Self::open) and kept in memory; every
/// `put` and `delete` rewrites the file through a temporary file in the same
/// directory, then renames it over the original. Readers of the file never
/// observe a half-written snapshot.
pub struct FileLedgerStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl FileLedgerStore {
    /// Open the snapshot at `path`, starting empty if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            load_snapshot(&path)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "opened ledger file");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
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

    fn flush(&self, map: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        let encoded: BTreeMap<&str, String> = map
            .iter()
            .map(|(k, v)| (k.as_str(), STANDARD.encode(v)))
            .collect();
        let json = serde_json::to_vec_pretty(&encoded)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> StoreResult<BTreeMap<String, Vec<u8>>> {
    let raw = fs::read(path)?;
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let encoded: BTreeMap<String, String> = serde_json::from_slice(&raw)
        .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
    encoded
        .into_iter()
        .map(|(key, value)| {
            STANDARD
                .decode(value.as_bytes())
                .map(|bytes| (key.clone(), bytes))
                .map_err(|e| StoreError::Serialization(format!("value for {key:?}: {e}")))
        })
        .collect()
}

impl LedgerStore for FileLedgerStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let previous = map.insert(key.to_string(), value.to_vec());
        if let Err(e) = self.flush(&map) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => map.insert(key.to_string(), old),
                None => map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(previous) = map.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.flush(&map) {
            map.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
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

impl std::fmt::Debug for FileLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLedgerStore")
            .field("path", &self.path)
            .field("key_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("ledger.json")
    }

    #[test]
    fn open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(ledger_path(&dir)).unwrap();
        assert!(store.is_empty());
        assert!(!ledger_path(&dir).exists());
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileLedgerStore::open(ledger_path(&dir)).unwrap();
            store.put("loan-7", b"{\"amount\":1000}").unwrap();
            store.put("loan-8", &[0, 159, 146, 150]).unwrap();
        }
        let store = FileLedgerStore::open(ledger_path(&dir)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("loan-7").unwrap().unwrap(), b"{\"amount\":1000}");
        assert_eq!(store.get("loan-8").unwrap().unwrap(), [0, 159, 146, 150]);
    }

    #[test]
    fn delete_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(ledger_path(&dir)).unwrap();
        store.put("a", b"1").unwrap();
        store.put("b", b"2").unwrap();
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());

        let reopened = FileLedgerStore::open(ledger_path(&dir)).unwrap();
        assert!(!reopened.exists("a").unwrap());
        assert!(reopened.exists("b").unwrap());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");
        let store = FileLedgerStore::open(&path).unwrap();
        store.put("k", b"v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn scan_is_ordered_and_releases_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(ledger_path(&dir)).unwrap();
        for key in ["c", "a", "b"] {
            store.put(key, key.as_bytes()).unwrap();
        }
        let keys: Vec<String> = store
            .scan_range("", "")
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ledger_path(&dir), b"{ not json").unwrap();
        let err = FileLedgerStore::open(ledger_path(&dir)).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn bad_base64_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ledger_path(&dir), br#"{"k":"***"}"#).unwrap();
        let err = FileLedgerStore::open(ledger_path(&dir)).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn blank_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ledger_path(&dir), b"\n").unwrap();
        let store = FileLedgerStore::open(ledger_path(&dir)).unwrap();
        assert!(store.is_empty());
    }
}
