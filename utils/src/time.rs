//! Time formatting helpers.

use adsettle_types::Timestamp;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Time left until `deadline`, formatted; `"0s"` once it has passed.
pub fn format_remaining(deadline: Timestamp, now: Timestamp) -> String {
    format_duration(deadline.as_secs().saturating_sub(now.as_secs()))
}
