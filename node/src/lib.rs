//! adsettle engine: orchestrates the contract workflow.
//!
//! The engine is the coordinator that:
//! - Maps a caller identity and a named operation onto the contract,
//!   escrow, submission and settlement components
//! - Runs each operation as one atomic ledger transaction
//! - Renders results and queries as strings for the dispatch layer

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod ops;
pub mod tracing_spans;

pub use config::{EngineConfig, EvidenceConfig};
pub use engine::Engine;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use ops::Operation;
