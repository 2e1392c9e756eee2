//! LMDB storage backend for adsettle.
//!
//! Implements [`adsettle_store::StateStore`] using the `heed` LMDB bindings.
//! Latest values and the per-key version history live in separate databases
//! inside a single environment, and every batch is one LMDB write transaction.

pub mod environment;
pub mod error;
pub mod state;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use state::LmdbStateStore;
