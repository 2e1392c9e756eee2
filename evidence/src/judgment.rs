//! Per-item judgments and the result-file format.
//!
//! A result file is a flat list of `1` (flag as cheating) and `-1` (clear)
//! tokens separated by whitespace or commas. Surrounding brackets are
//! tolerated so a JSON array such as `[1,-1,1]` parses too.

use crate::EvidenceError;
use serde::{Deserialize, Serialize};

/// A verifier's verdict on one delivered item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgment {
    /// `+1`: the item is flagged as cheating.
    Cheat,
    /// `-1`: the item is cleared.
    Clear,
}

impl Judgment {
    pub fn value(self) -> i8 {
        match self {
            Self::Cheat => 1,
            Self::Clear => -1,
        }
    }

    /// Majority verdict for a weighted sum; ties go to `Cheat`.
    pub fn from_weighted_sum(sum: f64) -> Self {
        if sum >= 0.0 {
            Self::Cheat
        } else {
            Self::Clear
        }
    }

    fn parse_token(position: usize, token: &str) -> Result<Self, EvidenceError> {
        match token {
            "1" | "+1" => Ok(Self::Cheat),
            "-1" => Ok(Self::Clear),
            _ => Err(EvidenceError::BadToken {
                position,
                token: token.to_string(),
            }),
        }
    }
}

/// Parse a result file into its judgment vector.
pub fn parse_judgments(raw: &str) -> Result<Vec<Judgment>, EvidenceError> {
    raw.split(|c: char| c.is_whitespace() || matches!(c, ',' | '[' | ']'))
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(i, t)| Judgment::parse_token(i, t))
        .collect()
}
