//! Parse errors for the primitive types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid party id: {0:?}")]
    InvalidPartyId(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),
}
