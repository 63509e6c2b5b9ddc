use thiserror::Error;

use crate::state::AssetState;

/// Errors produced by asset entity operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("illegal state transition: {from} -> {to}")]
    IllegalTransition { from: AssetState, to: AssetState },

    #[error("asset is {state}; no further changes are allowed")]
    Terminal { state: AssetState },

    #[error("unknown asset state: {0}")]
    UnknownState(String),

    #[error("asset id must not be empty")]
    EmptyAssetId,

    #[error("payment hash must not be empty")]
    EmptyPaymentHash,
}
