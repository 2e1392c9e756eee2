//! HTTP evidence fetcher with bounded retries and a bounded body size.

use std::io::Read;
use std::thread;
use std::time::Duration;

use crate::{EvidenceError, EvidenceFetcher};

/// Default cap on a result file: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Timeout, retry and size limits for evidence requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Backoff unit; attempt `n` waits `n * backoff` before retrying.
    pub backoff: Duration,
    /// Largest response body accepted.
    pub max_body_bytes: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff: Duration::from_millis(250),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Outcome of a single failed attempt.
enum AttemptError {
    /// Transport or status failure; worth another try.
    Transient(String),
    /// The endpoint answered with something unusable; retrying won't help.
    Rejected(String),
}

/// Read at most `limit` bytes of UTF-8 text from `reader`.
fn read_limited(reader: impl Read, limit: u64) -> Result<String, AttemptError> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| AttemptError::Transient(e.to_string()))?;
    if body.len() as u64 > limit {
        return Err(AttemptError::Rejected(format!("body exceeds {limit} bytes")));
    }
    String::from_utf8(body).map_err(|_| AttemptError::Rejected("body is not UTF-8".into()))
}

/// Fetches result files over HTTP(S).
pub struct HttpEvidenceFetcher {
    client: reqwest::blocking::Client,
    policy: FetchPolicy,
}

impl HttpEvidenceFetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self, EvidenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| EvidenceError::FetchFailed {
                location: String::new(),
                reason: format!("building HTTP client: {e}"),
            })?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    fn fetch_once(&self, location: &str) -> Result<String, AttemptError> {
        let resp = self
            .client
            .get(location)
            .timeout(self.policy.timeout)
            .send()
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AttemptError::Transient(format!("HTTP {}", resp.status())));
        }
        let limit = self.policy.max_body_bytes;
        if resp.content_length().is_some_and(|len| len > limit) {
            return Err(AttemptError::Rejected(format!("body exceeds {limit} bytes")));
        }
        read_limited(resp, limit)
    }
}

impl EvidenceFetcher for HttpEvidenceFetcher {
    fn fetch(&self, location: &str) -> Result<String, EvidenceError> {
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Err(EvidenceError::UnsupportedLocation(location.to_string()));
        }

        let mut last_error = String::new();
        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                thread::sleep(self.policy.backoff * attempt);
            }
            match self.fetch_once(location) {
                Ok(body) => return Ok(body),
                Err(AttemptError::Rejected(reason)) => {
                    tracing::warn!(location, %reason, "evidence response rejected");
                    return Err(EvidenceError::FetchFailed {
                        location: location.to_string(),
                        reason,
                    });
                }
                Err(AttemptError::Transient(reason)) => {
                    tracing::debug!(location, attempt, %reason, "evidence fetch failed");
                    last_error = reason;
                }
            }
        }
        Err(EvidenceError::FetchFailed {
            location: location.to_string(),
            reason: format!(
                "{last_error} (after {} attempts)",
                self.policy.max_retries + 1
            ),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
