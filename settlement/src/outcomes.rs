//! Settlement outcome processor: credit points and payment shares.
//!
//! From a [`Tally`] this module computes, per verifier:
//! - a credit delta: `right * right_credit - wrong * wrong_credit`, shifted
//!   so the deltas of one settlement sum to zero
//! - a payment share: `right / Σ right`, applied to the anti-cheat pool

use crate::error::SettlementError;
use crate::vote::{tally, Tally};
use adsettle_contract::ContractError;
use adsettle_evidence::Judgment;
use adsettle_store::ContractKey;
use adsettle_types::{Amount, PartyId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Credit for each item judged in line with the majority.
pub const RIGHT_CREDIT: u32 = 1;
/// Credit removed for each item judged against the majority.
pub const WRONG_CREDIT: u32 = 9;

/// Weights of right and wrong judgments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditPolicy {
    pub right_credit: Decimal,
    pub wrong_credit: Decimal,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            right_credit: Decimal::from(RIGHT_CREDIT),
            wrong_credit: Decimal::from(WRONG_CREDIT),
        }
    }
}

/// Result for a single verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierOutcome {
    pub anti_cheat_id: PartyId,
    pub right: u32,
    pub wrong: u32,
    /// Credit delta after mean-centering.
    pub point: Decimal,
    /// Fraction of the anti-cheat pool.
    pub share: Decimal,
    /// This verifier's part of `paymentAmountAntiCheat`.
    pub payment: Amount,
}

/// Persisted once a contract is settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub contract_key: ContractKey,
    pub settled_at: Timestamp,
    /// Majority verdict per item, `1` or `-1`.
    pub majority: Vec<i8>,
    pub verifiers: Vec<VerifierOutcome>,
}

/// Mean-centered credit deltas.
///
/// Fails with `Overflow` when a policy weight is too large for the
/// judgment counts involved.
pub fn credit_points(
    right: &[u32],
    wrong: &[u32],
    policy: &CreditPolicy,
) -> Result<Vec<Decimal>, SettlementError> {
    let overflow = || SettlementError::Overflow("credit points".into());
    let mut raw = Vec::with_capacity(right.len());
    for (&r, &w) in right.iter().zip(wrong) {
        let gained = Decimal::from(r).checked_mul(policy.right_credit).ok_or_else(overflow)?;
        let lost = Decimal::from(w).checked_mul(policy.wrong_credit).ok_or_else(overflow)?;
        raw.push(gained.checked_sub(lost).ok_or_else(overflow)?);
    }
    if raw.is_empty() {
        return Ok(raw);
    }
    let sum = raw
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
        .ok_or_else(overflow)?;
    let mean = sum.checked_div(Decimal::from(raw.len())).ok_or_else(overflow)?;
    raw.into_iter()
        .map(|p| p.checked_sub(mean).map(|d| d.normalize()).ok_or_else(overflow))
        .collect()
}

/// `pool * right / total`, multiplying first so whole-number splits stay
/// exact. A pool too large to multiply is divided first instead.
fn pool_part(pool: Amount, right: u32, total: Decimal) -> Result<Amount, SettlementError> {
    let right = Decimal::from(right);
    let value = pool
        .value()
        .checked_mul(right)
        .and_then(|v| v.checked_div(total))
        .or_else(|| pool.value().checked_div(total)?.checked_mul(right))
        .ok_or_else(|| SettlementError::Overflow("payment".into()))?;
    Ok(Amount::new(value).map_err(ContractError::from)?)
}

/// Each verifier's fraction of the right judgments.
///
/// Fails with `DegenerateVote` when nobody matched the majority.
pub fn payment_shares(right: &[u32]) -> Result<Vec<Decimal>, SettlementError> {
    let total: u64 = right.iter().map(|&r| u64::from(r)).sum();
    if total == 0 {
        return Err(SettlementError::DegenerateVote);
    }
    let total = Decimal::from(total);
    Ok(right
        .iter()
        .map(|&r| (Decimal::from(r) / total).normalize())
        .collect())
}

/// Run the vote and derive every verifier's outcome.
///
/// `verifiers`, `priorities` and `judgments` are parallel; every judgment
/// vector must have the same length.
pub fn compute_outcomes(
    verifiers: &[PartyId],
    priorities: &[f64],
    judgments: &[Vec<Judgment>],
    pool: Amount,
    policy: &CreditPolicy,
) -> Result<(Tally, Vec<VerifierOutcome>), SettlementError> {
    let tally = tally(judgments, priorities);
    let points = credit_points(&tally.right, &tally.wrong, policy)?;
    let shares = payment_shares(&tally.right)?;

    let total_right = Decimal::from(tally.right.iter().map(|&r| u64::from(r)).sum::<u64>());
    let mut outcomes = Vec::with_capacity(verifiers.len());
    for (i, id) in verifiers.iter().enumerate() {
        let payment = pool_part(pool, tally.right[i], total_right)?;
        outcomes.push(VerifierOutcome {
            anti_cheat_id: id.clone(),
            right: tally.right[i],
            wrong: tally.wrong[i],
            point: points[i],
            share: shares[i],
            payment,
        });
    }
    Ok((tally, outcomes))
}
