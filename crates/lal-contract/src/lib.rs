//! Loan asset service for the Loan Asset Ledger.
//!
//! [`AssetContract`] is the only way assets are created, read, moved through
//! their lifecycle, or removed. Each operation is one logical transaction
//! against an injected [`LedgerStore`]: resolve the caller when the operation
//! records who performed it, read and validate current state, mutate, write
//! back. The contract keeps no state of its own between calls.

pub mod contract;
pub mod error;
pub mod seed;

pub use contract::AssetContract;
pub use error::{ContractError, ContractResult};
pub use seed::{seed_assets, SeedAsset, SEED_ASSETS};

// Re-export key types
pub use lal_identity::{Base64IdentityResolver, CallerToken, IdentityResolver};
pub use lal_store::{FileLedgerStore, InMemoryLedgerStore, LedgerStore};
pub use lal_types::{state_name, Asset, AssetState};
