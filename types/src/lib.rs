//! Fundamental types for the adsettle contract engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! party identities, roles, decimal amounts, timestamps and key material.

pub mod amount;
pub mod error;
pub mod keys;
pub mod party;
pub mod role;
pub mod time;

pub use amount::{Amount, Credit};
pub use error::TypeError;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use party::PartyId;
pub use role::Role;
pub use time::{Clock, SystemClock, Timestamp};
