//! Settlement engine: fetch evidence, vote, then update verifier accounts.

use crate::error::SettlementError;
use crate::outcomes::{compute_outcomes, CreditPolicy, SettlementRecord};
use adsettle_contract::{verify_log, ContractError, MediaLogSubmit, SignatureContract};
use adsettle_crypto::Signer;
use adsettle_evidence::{parse_judgments, EvidenceFetcher, Judgment};
use adsettle_store::{AccountStore, ContractKey, StateKey, Transaction};
use adsettle_types::{PartyId, Timestamp};

pub struct SettlementEngine<'a> {
    signer: &'a dyn Signer,
    fetcher: &'a dyn EvidenceFetcher,
    policy: CreditPolicy,
}

impl<'a> SettlementEngine<'a> {
    pub fn new(signer: &'a dyn Signer, fetcher: &'a dyn EvidenceFetcher, policy: CreditPolicy) -> Self {
        Self {
            signer,
            fetcher,
            policy,
        }
    }

    /// Settle a contract whose verifier results are all in.
    ///
    /// Every result file is fetched and parsed before the first write, so a
    /// fetch or parse failure leaves `txn` untouched. Only verifier accounts
    /// change; the advertiser and media are paid through escrow.
    pub fn settle(
        &self,
        txn: &mut Transaction<'_>,
        caller: &PartyId,
        contract_key: &ContractKey,
        now: Timestamp,
    ) -> Result<SettlementRecord, SettlementError> {
        let sc: SignatureContract = txn.require_json(&StateKey::Contract(contract_key.clone()))?;
        let contract = &sc.contract;
        if !contract.is_participant(caller) {
            return Err(ContractError::unauthorized(caller, format!("settle {contract_key}")).into());
        }
        let settled_key = StateKey::Settled(contract_key.clone());
        if txn.exists(&settled_key)? {
            return Err(SettlementError::AlreadySettled(contract_key.clone()));
        }

        let need = contract.anti_cheat_ids.len();
        let Some(submission) = txn.get_json::<MediaLogSubmit>(&StateKey::Log(contract_key.clone()))? else {
            return Err(SettlementError::ContractNotReady { have: 0, need });
        };
        let have = submission.log.anti_cheat_result_address.len();
        if have < need {
            return Err(SettlementError::ContractNotReady { have, need });
        }
        verify_log(txn, self.signer, &submission, contract)?;

        let mut locations = Vec::with_capacity(need);
        for verifier in &contract.anti_cheat_ids {
            let entry = submission
                .log
                .result_of(verifier)
                .ok_or(SettlementError::ContractNotReady { have, need })?;
            locations.push((verifier, entry.address.as_str()));
        }
        let judgments = self.fetch_all(&locations)?;
        let priorities = contract.priority_weights()?;

        let (tally, outcomes) = compute_outcomes(
            &contract.anti_cheat_ids,
            &priorities,
            &judgments,
            contract.payment_amount_anti_cheat,
            &self.policy,
        )?;

        for outcome in &outcomes {
            let mut account = txn.get_account(&outcome.anti_cheat_id)?;
            account.assets = account
                .assets
                .checked_add(outcome.payment)
                .ok_or_else(|| SettlementError::Overflow(format!("assets of {}", outcome.anti_cheat_id)))?;
            account.credit = account
                .credit
                .checked_add(outcome.point)
                .ok_or_else(|| SettlementError::Overflow(format!("credit of {}", outcome.anti_cheat_id)))?;
            txn.put_account(&outcome.anti_cheat_id, &account)?;
            tracing::info!(
                contract = %contract_key,
                verifier = %outcome.anti_cheat_id,
                right = outcome.right,
                wrong = outcome.wrong,
                point = %outcome.point,
                payment = %outcome.payment,
                "verifier settled"
            );
        }

        let record = SettlementRecord {
            contract_key: contract_key.clone(),
            settled_at: now,
            majority: tally.majority.iter().map(|j| j.value()).collect(),
            verifiers: outcomes,
        };
        txn.put_json(settled_key, &record)?;
        tracing::info!(contract = %contract_key, items = record.majority.len(), "contract settled");
        Ok(record)
    }

    fn fetch_all(&self, locations: &[(&PartyId, &str)]) -> Result<Vec<Vec<Judgment>>, SettlementError> {
        let mut judgments: Vec<Vec<Judgment>> = Vec::with_capacity(locations.len());
        for &(verifier, location) in locations {
            let raw = self.fetcher.fetch(location).map_err(|e| {
                tracing::warn!(verifier = %verifier, location, fetcher = self.fetcher.name(), error = %e, "evidence fetch failed");
                SettlementError::EvidenceUnavailable {
                    verifier: verifier.clone(),
                    reason: e.to_string(),
                }
            })?;
            let row = parse_judgments(&raw).map_err(|e| SettlementError::MalformedEvidence {
                verifier: verifier.clone(),
                reason: e.to_string(),
            })?;
            if let Some(first) = judgments.first() {
                if first.len() != row.len() {
                    return Err(SettlementError::MalformedEvidence {
                        verifier: verifier.clone(),
                        reason: format!("{} judgments, expected {}", row.len(), first.len()),
                    });
                }
            }
            judgments.push(row);
        }
        Ok(judgments)
    }
}

/// Load the settlement record of a contract, if settled.
pub fn get_settlement(
    txn: &Transaction<'_>,
    contract_key: &ContractKey,
) -> Result<Option<SettlementRecord>, SettlementError> {
    Ok(txn.get_json(&StateKey::Settled(contract_key.clone()))?)
}
