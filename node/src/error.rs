use adsettle_contract::ContractError;
use adsettle_settlement::SettlementError;
use adsettle_store::StoreError;
use adsettle_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<TypeError> for NodeError {
    fn from(e: TypeError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}
