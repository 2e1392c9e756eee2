use adsettle_store::StoreError;
use adsettle_types::{Amount, PartyId, Timestamp, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("signature of {signer} failed verification")]
    SignatureInvalid { signer: PartyId },

    #[error("insufficient funds: need {needed}, available {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    #[error("funds still locked until {release_at} ({remaining} remaining)")]
    FundsStillLocked {
        release_at: Timestamp,
        remaining: String,
    },

    #[error("contract incomplete: {have} of {need} signatures")]
    ContractIncomplete { have: usize, need: usize },

    #[error("{party} is not allowed to {action}")]
    Unauthorized { party: PartyId, action: String },

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("storage error: {0}")]
    Store(StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ContractError {
    pub fn unauthorized(party: &PartyId, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            party: party.clone(),
            action: action.into(),
        }
    }
}

impl From<StoreError> for ContractError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => Self::NotFound(key),
            StoreError::Duplicate(key) => Self::Duplicate(key),
            StoreError::Serialization(msg) => Self::Serialization(msg),
            other => Self::Store(other),
        }
    }
}

impl From<TypeError> for ContractError {
    fn from(e: TypeError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
