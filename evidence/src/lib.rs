//! Verifier evidence: where judgment files come from and what they contain.
//!
//! Each anti-cheat organisation publishes a result file listing one judgment
//! per delivered item. The settlement engine consumes those files through the
//! [`EvidenceFetcher`] capability; [`HttpEvidenceFetcher`] is the production
//! implementation and bounds every request with a timeout and retry policy.

pub mod error;
pub mod http;
pub mod judgment;

pub use error::EvidenceError;
pub use http::{FetchPolicy, HttpEvidenceFetcher, DEFAULT_MAX_BODY_BYTES};
pub use judgment::{parse_judgments, Judgment};

/// Trait for retrieving a verifier's raw result file.
pub trait EvidenceFetcher: Send + Sync {
    /// Fetch the raw contents stored at `location`.
    fn fetch(&self, location: &str) -> Result<String, EvidenceError>;

    /// Human-readable name of this fetcher.
    fn name(&self) -> &str;
}
