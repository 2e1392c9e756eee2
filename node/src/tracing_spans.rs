//! Pre-built [`tracing::Span`] constructors for engine operations.

use tracing::{info_span, Span};

/// Span covering one named operation invoked by a caller.
pub fn operation_span(op: &str, caller: &str) -> Span {
    info_span!("operation", op = %op, caller = %caller)
}

/// Span covering the settlement of a single contract.
pub fn settlement_span(contract: &str) -> Span {
    info_span!("settle", contract = %contract)
}
