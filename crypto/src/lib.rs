//! Cryptographic primitives for adsettle.
//!
//! - **Ed25519** for contract and log signatures
//! - **Blake2b** for contract fingerprints embedded in contract keys
//!
//! The engine consumes signing through the [`Signer`] capability so that the
//! scheme stays swappable; [`Ed25519Signer`] is the production implementation.

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, fingerprint};
pub use keys::{generate_keypair, keypair_from_seed};
pub use sign::{sign_message, verify_signature, Ed25519Signer, Signer};
