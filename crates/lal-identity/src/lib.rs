//! Caller identity resolution for the Loan Asset Ledger.
//!
//! The hosting environment hands every invocation an opaque [`CallerToken`].
//! An [`IdentityResolver`] turns it into the plain identifier recorded on
//! the assets the caller creates. Resolution only decodes; deciding who may
//! invoke which operation is left to the surrounding system.

pub mod error;
pub mod resolver;

pub use error::{IdentityError, IdentityResult};
pub use resolver::{Base64IdentityResolver, CallerToken, IdentityResolver};
