use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// One `(key, value)` pair produced by a range scan.
pub type ScanEntry = (String, Vec<u8>);

/// Lazy, ordered sequence of ledger entries.
///
/// Backends hand out a `RangeScan` from [`LedgerStore::scan_range`]. The
/// optional [`CursorGuard`] is dropped together with the scan, so a caller
/// that stops early (including through `?`) still releases the cursor.
///
/// [`LedgerStore::scan_range`]: crate::traits::LedgerStore::scan_range
pub struct RangeScan<'a> {
    entries: Box<dyn Iterator<Item = StoreResult<ScanEntry>> + Send + 'a>,
    guard: Option<CursorGuard>,
}

impl<'a> RangeScan<'a> {
    /// Wrap a backend iterator.
    pub fn new<I>(entries: I) -> Self
    where
        I: Iterator<Item = StoreResult<ScanEntry>> + Send + 'a,
    {
        Self {
            entries: Box::new(entries),
            guard: None,
        }
    }

    /// Wrap a backend iterator whose cursor must be released on drop.
    pub fn with_guard<I>(entries: I, guard: CursorGuard) -> Self
    where
        I: Iterator<Item = StoreResult<ScanEntry>> + Send + 'a,
    {
        Self {
            entries: Box::new(entries),
            guard: Some(guard),
        }
    }

    /// An exhausted scan.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for RangeScan<'_> {
    type Item = StoreResult<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

impl std::fmt::Debug for RangeScan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeScan")
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// Open-cursor accounting for a backend.
///
/// Creating a guard increments the shared counter; dropping it decrements.
#[derive(Debug)]
pub struct CursorGuard {
    open: Arc<AtomicUsize>,
}

impl CursorGuard {
    pub fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            open: Arc::clone(counter),
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Translate string bounds into `BTreeMap` range bounds.
///
/// Empty strings are unbounded. Rejects `start > end` up front, since
/// `BTreeMap::range` panics on inverted ranges.
pub(crate) fn key_bounds(start: &str, end: &str) -> StoreResult<(Bound<String>, Bound<String>)> {
    if !start.is_empty() && !end.is_empty() && start > end {
        return Err(StoreError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start.to_string())
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end.to_string())
    };
    Ok((lower, upper))
}

/// Copy the entries of `map` that fall within the bounds.
///
/// Callers hold the backend's read lock, so the returned scan owns its data.
pub(crate) fn snapshot_range(
    map: &BTreeMap<String, Vec<u8>>,
    start: &str,
    end: &str,
) -> StoreResult<Vec<ScanEntry>> {
    let bounds = key_bounds(start, end)?;
    Ok(map
        .range::<String, _>(bounds)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect())
}
