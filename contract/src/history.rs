//! History projection: a key's committed versions as JSON lines.

use crate::error::ContractError;
use adsettle_store::{HistoryIter, StateKey, Transaction};
use adsettle_types::Timestamp;
use serde::Serialize;
use serde_json::value::RawValue;

#[derive(Serialize)]
struct HistoryLine<'a> {
    timestamp: Timestamp,
    value: &'a RawValue,
}

/// Render every non-delete version in `entries`, oldest first, one JSON
/// object per line. Drains the iterator in a single pass.
pub fn project(entries: HistoryIter<'_>) -> Result<String, ContractError> {
    let mut lines = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.is_delete {
            continue;
        }
        let text = std::str::from_utf8(&entry.value)
            .map_err(|e| ContractError::Serialization(e.to_string()))?;
        let value: &RawValue = serde_json::from_str(text)?;
        lines.push(serde_json::to_string(&HistoryLine {
            timestamp: entry.timestamp,
            value,
        })?);
    }
    Ok(lines.join("\n"))
}

/// Project the committed history of `key`.
pub fn project_key(txn: &Transaction<'_>, key: &StateKey) -> Result<String, ContractError> {
    project(txn.history(key)?)
}
