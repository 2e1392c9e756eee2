//! Media log submission and verifier confirmation.

use crate::error::ContractError;
use crate::model::{Contract, ContractSignature, Log, LogNotice, MediaLogSubmit, ResultEntry, SignatureContract};
use crate::signatures::{sign_as, verify_each};
use adsettle_crypto::Signer;
use adsettle_store::{ContractKey, StateKey, Transaction};
use adsettle_types::{PartyId, PrivateKey, Timestamp};

pub struct SubmissionProtocol<'a> {
    signer: &'a dyn Signer,
}

impl<'a> SubmissionProtocol<'a> {
    pub fn new(signer: &'a dyn Signer) -> Self {
        Self { signer }
    }

    /// Media submits the location of its delivery log for a fully signed
    /// contract. Each verifier is notified through its log feed.
    pub fn submit_media_log(
        &self,
        txn: &mut Transaction<'_>,
        caller: &PartyId,
        contract_key: &ContractKey,
        evidence_address: &str,
        key: &PrivateKey,
        now: Timestamp,
    ) -> Result<(), ContractError> {
        let sc: SignatureContract = txn.require_json(&StateKey::Contract(contract_key.clone()))?;
        if *caller != sc.contract.media_id {
            return Err(ContractError::unauthorized(caller, format!("submit the log of {contract_key}")));
        }
        if !sc.is_fully_signed() {
            return Err(ContractError::ContractIncomplete {
                have: sc.contract_signature.len(),
                need: sc.contract.required_signatures(),
            });
        }
        let log_key = StateKey::Log(contract_key.clone());
        if txn.exists(&log_key)? {
            return Err(ContractError::Duplicate(log_key.encode()));
        }
        let address = evidence_address.trim();
        if address.is_empty() {
            return Err(ContractError::InvalidArgument("evidence address is empty".into()));
        }

        let log = Log {
            address: address.to_string(),
            time_stamp: now,
            anti_cheat_num: sc.contract.anti_cheat_ids.len(),
            anti_cheat_result_address: Vec::new(),
        };
        let mut signatures = ContractSignature::new();
        signatures.insert(
            caller.clone(),
            sign_as(txn, self.signer, caller, &log.signing_bytes()?, key)?,
        );

        let notice = LogNotice {
            log_key: log_key.encode(),
            contract_key: contract_key.clone(),
            media_id: caller.clone(),
        };
        for verifier in &sc.contract.anti_cheat_ids {
            txn.put_json(StateKey::LogIndex(verifier.clone()), &notice)?;
        }
        txn.put_json(
            log_key,
            &MediaLogSubmit {
                log,
                contract_signature: signatures,
            },
        )?;
        tracing::info!(contract = %contract_key, media = %caller, "media log submitted");
        Ok(())
    }

    /// A verifier countersigns the log and records where its result file is.
    ///
    /// Returns `(confirmations, expected)`. Each verifier confirms once.
    pub fn confirm_anti_cheat_result(
        &self,
        txn: &mut Transaction<'_>,
        caller: &PartyId,
        contract_key: &ContractKey,
        evidence_address: &str,
        key: &PrivateKey,
    ) -> Result<(usize, usize), ContractError> {
        let sc: SignatureContract = txn.require_json(&StateKey::Contract(contract_key.clone()))?;
        if !sc.contract.is_verifier(caller) {
            return Err(ContractError::unauthorized(caller, format!("confirm the log of {contract_key}")));
        }
        let log_key = StateKey::Log(contract_key.clone());
        let mut submission: MediaLogSubmit = txn.require_json(&log_key)?;
        if submission.log.result_of(caller).is_some() || submission.contract_signature.contains(caller) {
            return Err(ContractError::Duplicate(format!("{caller} already confirmed {contract_key}")));
        }
        let address = evidence_address.trim();
        if address.is_empty() {
            return Err(ContractError::InvalidArgument("evidence address is empty".into()));
        }

        verify_log(txn, self.signer, &submission, &sc.contract)?;

        let entry = ResultEntry {
            anti_cheat_id: caller.clone(),
            address: address.to_string(),
        };
        let message = submission.log.result_signing_bytes(&entry)?;
        let signature = sign_as(txn, self.signer, caller, &message, key)?;
        submission.contract_signature.insert(caller.clone(), signature);
        submission.log.anti_cheat_result_address.push(entry);
        let have = submission.log.anti_cheat_result_address.len();
        let need = submission.log.anti_cheat_num;
        txn.put_json(log_key, &submission)?;
        tracing::info!(contract = %contract_key, verifier = %caller, have, need, "anti-cheat result confirmed");
        if have == need {
            tracing::info!(contract = %contract_key, "all verifier results in; ready to settle");
        }
        Ok((have, need))
    }
}

/// Re-verify a log submission: the media signature over the log header,
/// and each verifier's signature over the header plus its own result entry.
/// A result entry without its verifier's signature is rejected.
pub fn verify_log(
    txn: &Transaction<'_>,
    signer: &dyn Signer,
    submission: &MediaLogSubmit,
    contract: &Contract,
) -> Result<(), ContractError> {
    let log = &submission.log;
    for entry in &log.anti_cheat_result_address {
        if !contract.is_verifier(&entry.anti_cheat_id)
            || !submission.contract_signature.contains(&entry.anti_cheat_id)
        {
            return Err(ContractError::SignatureInvalid {
                signer: entry.anti_cheat_id.clone(),
            });
        }
    }
    verify_each(txn, signer, &submission.contract_signature, |party| {
        if *party == contract.media_id {
            return log.signing_bytes().map(Some);
        }
        match log.result_of(party) {
            Some(entry) if contract.is_verifier(party) => log.result_signing_bytes(entry).map(Some),
            _ => Ok(None),
        }
    })
}

/// Load the log submission of a contract.
pub fn get_log(
    txn: &Transaction<'_>,
    contract_key: &ContractKey,
) -> Result<MediaLogSubmit, ContractError> {
    Ok(txn.require_json(&StateKey::Log(contract_key.clone()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Fixture;
    use adsettle_store::StateStore;

    #[test]
    fn submit_requires_full_signatures() {
        let fx = Fixture::new(100);
        let key = fx.create();
        fx.confirm(1, &key, true).unwrap();
        assert!(matches!(
            fx.submit(1, &key, "http://media/log"),
            Err(ContractError::ContractIncomplete { have: 2, need: 4 })
        ));
    }

    #[test]
    fn only_media_submits_and_only_once() {
        let fx = Fixture::new(100);
        let key = fx.published();
        assert!(matches!(
            fx.submit(2, &key, "http://x"),
            Err(ContractError::Unauthorized { .. })
        ));
        fx.submit(1, &key, "http://media/log").unwrap();
        assert!(matches!(
            fx.submit(1, &key, "http://media/log2"),
            Err(ContractError::Duplicate(_))
        ));

        let notices: Vec<LogNotice> = fx
            .store
            .history(&StateKey::LogIndex(fx.id(2).clone()))
            .unwrap()
            .map(|e| serde_json::from_slice(&e.unwrap().value).unwrap())
            .collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].contract_key, key);
        assert_eq!(notices[0].log_key, format!("log/{key}"));
    }

    #[test]
    fn confirmations_accumulate_in_arrival_order() {
        let fx = Fixture::new(100);
        let key = fx.published();
        fx.submit(1, &key, "http://media/log").unwrap();

        assert_eq!(fx.verify(3, &key, "http://ac2/result").unwrap(), (1, 2));
        assert!(matches!(
            fx.verify(3, &key, "http://ac2/again"),
            Err(ContractError::Duplicate(_))
        ));
        assert_eq!(fx.verify(2, &key, "http://ac1/result").unwrap(), (2, 2));

        let txn = Transaction::begin(&fx.store);
        let submission = get_log(&txn, &key).unwrap();
        assert!(submission.log.is_complete());
        assert_eq!(submission.contract_signature.len(), 3);
        assert_eq!(submission.log.result_of(fx.id(2)).unwrap().address, "http://ac1/result");
        assert_eq!(submission.log.anti_cheat_result_address[0].anti_cheat_id, *fx.id(3));
    }

    #[test]
    fn media_cannot_confirm_and_missing_log_is_not_found() {
        let fx = Fixture::new(100);
        let key = fx.published();
        assert!(matches!(fx.verify(2, &key, "http://ac1"), Err(ContractError::NotFound(_))));
        fx.submit(1, &key, "http://media/log").unwrap();
        assert!(matches!(fx.verify(1, &key, "http://m"), Err(ContractError::Unauthorized { .. })));
    }

    #[test]
    fn corrupted_confirmation_blocks_later_verifiers() {
        let fx = Fixture::new(100);
        let key = fx.published();
        fx.submit(1, &key, "http://media/log").unwrap();
        fx.verify(2, &key, "http://ac1/result").unwrap();

        let txn = Transaction::begin(&fx.store);
        let mut submission = get_log(&txn, &key).unwrap();
        drop(txn);
        let mut forged = submission.contract_signature.get(fx.id(2)).unwrap().clone();
        forged.0[5] ^= 0x10;
        submission.contract_signature.insert(fx.id(2).clone(), forged);
        fx.store.force_put(StateKey::Log(key.clone()), serde_json::to_vec(&submission).unwrap());

        let err = fx.verify(3, &key, "http://ac2/result").unwrap_err();
        assert!(matches!(err, ContractError::SignatureInvalid { ref signer } if signer == fx.id(2)));
    }

    #[test]
    fn rewritten_result_address_fails_verification() {
        let fx = Fixture::new(100);
        let key = fx.published();
        fx.submit(1, &key, "http://media/log").unwrap();
        fx.verify(2, &key, "http://ac1/result").unwrap();

        let txn = Transaction::begin(&fx.store);
        let mut submission = get_log(&txn, &key).unwrap();
        drop(txn);
        submission.log.anti_cheat_result_address[0].address = "http://elsewhere/result".into();
        fx.store.force_put(StateKey::Log(key.clone()), serde_json::to_vec(&submission).unwrap());

        let err = fx.verify(3, &key, "http://ac2/result").unwrap_err();
        assert!(matches!(err, ContractError::SignatureInvalid { ref signer } if signer == fx.id(2)));
    }

    #[test]
    fn unsigned_result_entry_is_rejected() {
        let fx = Fixture::new(100);
        let key = fx.published();
        fx.submit(1, &key, "http://media/log").unwrap();

        let txn = Transaction::begin(&fx.store);
        let mut submission = get_log(&txn, &key).unwrap();
        drop(txn);
        submission.log.anti_cheat_result_address.push(ResultEntry {
            anti_cheat_id: fx.id(2).clone(),
            address: "http://injected".into(),
        });
        fx.store.force_put(StateKey::Log(key.clone()), serde_json::to_vec(&submission).unwrap());

        let err = fx.verify(3, &key, "http://ac2/result").unwrap_err();
        assert!(matches!(err, ContractError::SignatureInvalid { ref signer } if signer == fx.id(2)));
    }
}
