//! Nullable evidence fetcher: canned result files.

use adsettle_evidence::{EvidenceError, EvidenceFetcher};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves result files from memory.
///
/// Locations that were never registered fail like an unreachable endpoint.
/// Every request is recorded so tests can assert on fetch order.
#[derive(Default)]
pub struct NullEvidenceFetcher {
    files: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl NullEvidenceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the contents served at `location`.
    pub fn insert(&self, location: impl Into<String>, contents: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(location.into(), contents.into());
    }

    /// Locations requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl EvidenceFetcher for NullEvidenceFetcher {
    fn fetch(&self, location: &str) -> Result<String, EvidenceError> {
        self.requests.lock().unwrap().push(location.to_string());
        self.files
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| EvidenceError::FetchFailed {
                location: location.to_string(),
                reason: "no such null evidence".into(),
            })
    }

    fn name(&self) -> &str {
        "null-evidence"
    }
}
