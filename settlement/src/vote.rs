//! Weighted majority vote across verifiers.

use adsettle_evidence::Judgment;

/// Agreement of every verifier with the weighted majority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    /// Majority verdict per item.
    pub majority: Vec<Judgment>,
    /// Items on which verifier `i` matched the majority.
    pub right: Vec<u32>,
    /// Items on which verifier `i` disagreed.
    pub wrong: Vec<u32>,
}

/// Majority verdict per item: the sign of `Σ_i judgment[i][j] * priority[i]`,
/// ties counted as cheating.
///
/// All judgment vectors must have the same length.
pub fn weighted_majority(judgments: &[Vec<Judgment>], priorities: &[f64]) -> Vec<Judgment> {
    let items = judgments.first().map_or(0, Vec::len);
    (0..items)
        .map(|j| {
            let sum: f64 = judgments
                .iter()
                .zip(priorities)
                .map(|(row, weight)| f64::from(row[j].value()) * weight)
                .sum();
            Judgment::from_weighted_sum(sum)
        })
        .collect()
}

/// Count each verifier's agreement with the weighted majority.
pub fn tally(judgments: &[Vec<Judgment>], priorities: &[f64]) -> Tally {
    let majority = weighted_majority(judgments, priorities);
    let mut right = Vec::with_capacity(judgments.len());
    let mut wrong = Vec::with_capacity(judgments.len());
    for row in judgments {
        let agreed = row.iter().zip(&majority).filter(|(a, b)| a == b).count() as u32;
        right.push(agreed);
        wrong.push(majority.len() as u32 - agreed);
    }
    Tally {
        majority,
        right,
        wrong,
    }
}
