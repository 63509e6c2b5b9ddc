use crate::error::StoreResult;
use crate::scan::RangeScan;

/// Flat string-to-bytes ledger consumed by the contract layer.
///
/// All implementations must satisfy these invariants:
/// - `get` on a missing key returns `Ok(None)`, never an error.
/// - `put` overwrites unconditionally.
/// - `scan_range` yields `(key, value)` pairs in ascending key order within
///   `[start, end)`. An empty `start` or `end` leaves that side unbounded, so
///   `scan_range("", "")` enumerates the whole keyspace.
/// - The returned [`RangeScan`] releases any backend cursor when dropped.
/// - All I/O errors are propagated, never silently ignored.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored at `key`.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Insert or replace the value at `key`.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove `key`. Returns `true` if the key existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Enumerate entries between two key bounds.
    ///
    /// Consumers see a lazy iterator, but the bundled backends copy the
    /// matching range under their read lock when the scan is opened. No lock
    /// is held while the caller iterates and later writes are not observed,
    /// at the cost of memory proportional to the range.
    fn scan_range(&self, start: &str, end: &str) -> StoreResult<RangeScan<'_>>;

    /// Check whether `key` holds a value.
    ///
    /// Default implementation calls `get()`. Backends may override to avoid
    /// copying the value.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
