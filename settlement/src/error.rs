use adsettle_contract::ContractError;
use adsettle_store::{ContractKey, StoreError};
use adsettle_types::PartyId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("contract not ready: {have} of {need} verifier results")]
    ContractNotReady { have: usize, need: usize },

    #[error("contract {0} is already settled")]
    AlreadySettled(ContractKey),

    #[error("malformed evidence from {verifier}: {reason}")]
    MalformedEvidence { verifier: PartyId, reason: String },

    #[error("evidence of {verifier} unavailable: {reason}")]
    EvidenceUnavailable { verifier: PartyId, reason: String },

    #[error("degenerate vote: no verifier agreed with the majority on any item")]
    DegenerateVote,

    #[error("arithmetic overflow computing {0}")]
    Overflow(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl From<StoreError> for SettlementError {
    fn from(e: StoreError) -> Self {
        Self::Contract(e.into())
    }
}
