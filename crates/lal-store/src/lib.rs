//! Key-value ledger port for the Loan Asset Ledger.
//!
//! The contract layer never talks to a concrete storage engine. It depends on
//! the [`LedgerStore`] trait: a flat string-to-bytes keyspace with point
//! reads, upserts, deletes and ordered range scans.
//!
//! # Storage Backends
//!
//! - [`InMemoryLedgerStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileLedgerStore`] -- JSON snapshot file, rewritten atomically on every mutation
//!
//! # Design Rules
//!
//! 1. Absence is not an error: `get` returns `Ok(None)`.
//! 2. `put` is an upsert; failures are storage faults, never logical conflicts.
//! 3. Range scans yield entries in ascending key order over `[start, end)`,
//!    with an empty bound meaning unbounded.
//! 4. Dropping a [`RangeScan`] releases its cursor, whether or not it was
//!    exhausted.
//! 5. The store never interprets values.

pub mod error;
pub mod file;
pub mod memory;
pub mod scan;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileLedgerStore;
pub use memory::InMemoryLedgerStore;
pub use scan::{CursorGuard, RangeScan, ScanEntry};
pub use traits::LedgerStore;
