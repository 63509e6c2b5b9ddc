/// Errors from ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("ledger keys must not be empty")]
    EmptyKey,

    /// Scan lower bound sorts after the upper bound.
    #[error("invalid scan range: start {start:?} is after end {end:?}")]
    InvalidRange { start: String, end: String },

    /// Serialization or deserialization failure of the backing file.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("ledger lock poisoned")]
    LockPoisoned,

    /// Any other backend fault.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
