//! Foundation types for the Loan Asset Ledger (LAL).
//!
//! This crate provides the loan asset record and the lifecycle state machine
//! that governs it. Every other LAL crate depends on `lal-types`.
//!
//! # Key Types
//!
//! - [`Asset`] — A single loan instrument as persisted in the ledger
//! - [`AssetState`] — Lifecycle classification (ISSUED → PENDING → TRADING → REDEEMED)
//! - [`TypeError`] — Invariant violations raised by the entity itself

pub mod asset;
pub mod error;
pub mod state;

pub use asset::Asset;
pub use error::TypeError;
pub use state::{state_name, AssetState};
