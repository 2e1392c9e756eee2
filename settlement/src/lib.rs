//! Weighted-vote settlement.
//!
//! Once every verifier of a contract has confirmed the media log, each
//! verifier's result file is fetched and the judgments are combined by a
//! priority-weighted majority vote. Verifiers are then rewarded by how often
//! they agreed with the majority: a share of the anti-cheat payment
//! proportional to their right answers, and a zero-sum credit adjustment that
//! penalises a wrong answer nine times as hard as it rewards a right one.

pub mod engine;
pub mod error;
pub mod outcomes;
pub mod vote;

pub use engine::{get_settlement, SettlementEngine};
pub use error::SettlementError;
pub use outcomes::{
    compute_outcomes, credit_points, payment_shares, CreditPolicy, SettlementRecord,
    VerifierOutcome, RIGHT_CREDIT, WRONG_CREDIT,
};
pub use vote::{tally, weighted_majority, Tally};
