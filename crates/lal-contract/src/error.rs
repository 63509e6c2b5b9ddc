use lal_identity::IdentityError;
use lal_store::StoreError;
use lal_types::TypeError;
use thiserror::Error;

/// Failures surfaced by [`AssetContract`](crate::AssetContract) operations.
///
/// Every variant names a distinct cause so callers can branch on it. Nothing
/// is retried internally.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("the asset {0} already exists")]
    AlreadyExists(String),

    #[error("the asset {0} does not exist")]
    NotFound(String),

    #[error("asset id must not be empty")]
    InvalidAssetId,

    #[error("failed to decode asset {id}: {source}")]
    Deserialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record stored under {key} carries asset id {found:?}")]
    KeyMismatch { key: String, found: String },

    #[error("failed to encode asset {id}: {source}")]
    Serialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to resolve caller identity: {0}")]
    IdentityDecode(#[from] IdentityError),

    #[error("ledger error: {0}")]
    Storage(#[from] StoreError),

    #[error("invalid state transition for asset {id}: {source}")]
    InvalidStateTransition {
        id: String,
        #[source]
        source: TypeError,
    },

    #[error("invalid payment hash for asset {0}")]
    InvalidPaymentHash(String),
}

impl ContractError {
    /// Attach the asset id to an entity-level error.
    pub(crate) fn from_entity(id: &str, err: TypeError) -> Self {
        match err {
            TypeError::EmptyAssetId => Self::InvalidAssetId,
            TypeError::EmptyPaymentHash => Self::InvalidPaymentHash(id.to_string()),
            other => Self::InvalidStateTransition {
                id: id.to_string(),
                source: other,
            },
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;
