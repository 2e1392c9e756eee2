//! Shared utilities for adsettle.

pub mod logging;
pub mod time;

pub use logging::{env_filter, init_tracing};
pub use time::{format_duration, format_remaining};
