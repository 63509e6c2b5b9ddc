//! Error types for identity resolution.

use thiserror::Error;

/// Errors raised while decoding a caller token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The token is not valid base64.
    #[error("failed to base64 decode caller identity: {0}")]
    InvalidEncoding(String),

    /// The decoded bytes are not UTF-8.
    #[error("caller identity is not valid UTF-8")]
    NotUtf8,

    /// The token decoded to an empty identifier.
    #[error("caller identity is empty")]
    Empty,
}

/// Convenience type alias for identity operations.
pub type IdentityResult<T> = std::result::Result<T, IdentityError>;
