use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvidenceError {
    #[error("failed to fetch evidence from {location}: {reason}")]
    FetchFailed { location: String, reason: String },

    #[error("unsupported evidence location: {0}")]
    UnsupportedLocation(String),

    #[error("malformed judgment {token:?} at position {position}")]
    BadToken { position: usize, token: String },
}
