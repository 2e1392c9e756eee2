//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the contract engine (clock, ledger, evidence
//! endpoints) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod evidence;
pub mod store;

pub use clock::NullClock;
pub use evidence::NullEvidenceFetcher;
pub use store::NullStateStore;
