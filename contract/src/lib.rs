//! Multi-party advertising contracts.
//!
//! A contract moves through `Created -> PartiallySigned -> FullySigned/Published
//! -> LogSubmitted -> AntiCheatConfirming`; settlement lives in
//! `adsettle-settlement`. Every operation works on a [`Transaction`] supplied by
//! the caller and commits nothing itself, so a failed operation leaves no trace.
//!
//! [`Transaction`]: adsettle_store::Transaction

pub mod accounts;
pub mod error;
pub mod escrow;
pub mod history;
pub mod model;
pub mod registry;
pub mod signatures;
pub mod submission;

#[cfg(test)]
mod testutil;

pub use accounts::{require_role, set_account};
pub use error::ContractError;
pub use escrow::{EscrowLedger, DEFAULT_LOCK_SECS};
pub use history::{project, project_key};
pub use model::{
    Contract, ContractNotice, ContractSignature, FreezeRecord, Log, LogNotice, MediaLogSubmit,
    ResultEntry, SignatureContract,
};
pub use registry::{get_contract, ConfirmOutcome, ContractRegistry, ContractTerms};
pub use signatures::{sign_as, verify_all, verify_each};
pub use submission::{get_log, verify_log, SubmissionProtocol};
