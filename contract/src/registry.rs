//! Contract registry: creation, co-signing and publication.

use crate::accounts::require_role;
use crate::error::ContractError;
use crate::escrow::EscrowLedger;
use crate::model::{parse_priorities, Contract, ContractNotice, ContractSignature, SignatureContract};
use crate::signatures::{sign_as, verify_all};
use adsettle_crypto::{fingerprint, Signer};
use adsettle_store::{ContractKey, StateKey, Transaction};
use adsettle_types::{Amount, PartyId, PrivateKey, Role, Timestamp};
use std::collections::HashSet;

/// Terms supplied by the advertiser when creating a contract.
#[derive(Clone, Debug)]
pub struct ContractTerms {
    pub media_id: PartyId,
    pub anti_cheat_ids: Vec<PartyId>,
    pub payment_threshold: Amount,
    pub payment_amount_media: Amount,
    pub payment_amount_anti_cheat: Amount,
    pub share_type: String,
    pub priorities: Vec<String>,
}

/// What a confirmation call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The caller's signature was stored.
    Signed { have: usize, need: usize },
    /// The advertiser published the fully signed contract.
    Published,
    /// Already published; nothing written.
    AlreadyPublished,
}

/// Creates contracts and collects participant signatures.
pub struct ContractRegistry<'a> {
    signer: &'a dyn Signer,
    escrow: EscrowLedger,
}

impl<'a> ContractRegistry<'a> {
    pub fn new(signer: &'a dyn Signer, escrow: EscrowLedger) -> Self {
        Self { signer, escrow }
    }

    /// Create a contract signed by `creator`, freeze the media payment and
    /// announce it in every participant's confirm feed.
    ///
    /// Nothing is written to `txn` when any step fails.
    pub fn generate_contract(
        &self,
        txn: &mut Transaction<'_>,
        creator: &PartyId,
        terms: ContractTerms,
        key: &PrivateKey,
        now: Timestamp,
    ) -> Result<ContractKey, ContractError> {
        validate_terms(creator, &terms)?;
        require_role(txn, creator, Role::Advertiser)
            .map_err(|_| ContractError::unauthorized(creator, "create contracts"))?;
        require_role(txn, &terms.media_id, Role::Media)?;
        for verifier in &terms.anti_cheat_ids {
            require_role(txn, verifier, Role::AntiCheat)?;
        }

        let contract = Contract {
            advertiser_id: creator.clone(),
            media_id: terms.media_id,
            anti_cheat_ids: terms.anti_cheat_ids,
            payment_threshold: terms.payment_threshold,
            payment_amount_media: terms.payment_amount_media,
            payment_amount_anti_cheat: terms.payment_amount_anti_cheat,
            anti_cheat_share_type: terms.share_type,
            anti_cheat_priority: terms.priorities,
            time_stamp: now,
        };
        let bytes = contract.canonical_bytes()?;
        let contract_key = ContractKey::derive(
            &contract.advertiser_id,
            &contract.media_id,
            &contract.anti_cheat_ids,
            now,
            &fingerprint(&bytes),
        );
        let state_key = StateKey::Contract(contract_key.clone());
        if txn.exists(&state_key)? {
            return Err(ContractError::Duplicate(state_key.encode()));
        }

        let mut signatures = ContractSignature::new();
        signatures.insert(creator.clone(), sign_as(txn, self.signer, creator, &bytes, key)?);

        // Escrow first: a failed charge leaves the overlay untouched.
        self.escrow.charge_and_freeze(
            txn,
            creator,
            contract.payment_amount_media,
            &contract_key,
            now,
        )?;

        let notice = ContractNotice {
            contract_key: contract_key.clone(),
            advertiser_id: creator.clone(),
        };
        for party in contract.participants() {
            txn.put_json(StateKey::ConfirmIndex(party.clone()), &notice)?;
        }
        txn.put_json(
            state_key,
            &SignatureContract {
                contract,
                contract_signature: signatures,
                published: false,
            },
        )?;
        tracing::info!(contract = %contract_key, advertiser = %creator, "contract created");
        Ok(contract_key)
    }

    /// Re-verify the collected signatures, then either sign as `caller` or,
    /// for the advertiser of a fully signed contract, publish it.
    pub fn confirm_contract(
        &self,
        txn: &mut Transaction<'_>,
        caller: &PartyId,
        contract_key: &ContractKey,
        key: Option<&PrivateKey>,
    ) -> Result<ConfirmOutcome, ContractError> {
        let state_key = StateKey::Contract(contract_key.clone());
        let mut sc: SignatureContract = txn.require_json(&state_key)?;
        if !sc.contract.is_participant(caller) {
            return Err(ContractError::unauthorized(caller, format!("sign {contract_key}")));
        }

        let bytes = sc.contract.canonical_bytes()?;
        verify_all(txn, self.signer, &bytes, &sc.contract_signature, |p| {
            sc.contract.is_participant(p)
        })?;

        let need = sc.contract.required_signatures();
        if *caller == sc.contract.advertiser_id && sc.is_fully_signed() {
            if sc.published {
                tracing::info!(contract = %contract_key, "contract already published");
                return Ok(ConfirmOutcome::AlreadyPublished);
            }
            let notice = ContractNotice {
                contract_key: contract_key.clone(),
                advertiser_id: caller.clone(),
            };
            for party in std::iter::once(&sc.contract.media_id).chain(&sc.contract.anti_cheat_ids) {
                txn.put_json(StateKey::ContractIndex(party.clone()), &notice)?;
            }
            sc.published = true;
            txn.put_json(state_key, &sc)?;
            tracing::info!(contract = %contract_key, "contract published");
            return Ok(ConfirmOutcome::Published);
        }

        let Some(key) = key else {
            if *caller == sc.contract.advertiser_id {
                return Err(ContractError::ContractIncomplete {
                    have: sc.contract_signature.len(),
                    need,
                });
            }
            return Err(ContractError::InvalidArgument(
                "a private key is required to sign".into(),
            ));
        };
        let signature = sign_as(txn, self.signer, caller, &bytes, key)?;
        sc.contract_signature.insert(caller.clone(), signature);
        let have = sc.contract_signature.len();
        txn.put_json(state_key, &sc)?;
        tracing::info!(contract = %contract_key, signer = %caller, have, need, "signature added");
        Ok(ConfirmOutcome::Signed { have, need })
    }
}

/// Load a contract for reading.
pub fn get_contract(
    txn: &Transaction<'_>,
    contract_key: &ContractKey,
) -> Result<SignatureContract, ContractError> {
    Ok(txn.require_json(&StateKey::Contract(contract_key.clone()))?)
}

fn validate_terms(creator: &PartyId, terms: &ContractTerms) -> Result<(), ContractError> {
    let invalid = |msg: String| Err(ContractError::InvalidArgument(msg));
    if terms.anti_cheat_ids.is_empty() {
        return invalid("at least one anti-cheat verifier is required".into());
    }
    if terms.share_type.trim().is_empty() {
        return invalid("share type is required".into());
    }
    if terms.priorities.len() != terms.anti_cheat_ids.len() {
        return invalid(format!(
            "{} priorities given for {} verifiers",
            terms.priorities.len(),
            terms.anti_cheat_ids.len()
        ));
    }
    parse_priorities(&terms.priorities)?;

    let mut seen = HashSet::new();
    for party in [creator, &terms.media_id].into_iter().chain(&terms.anti_cheat_ids) {
        if !seen.insert(party) {
            return invalid(format!("{party} appears more than once"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Fixture;
    use adsettle_crypto::Ed25519Signer;
    use adsettle_store::{AccountStore, StateStore, StoreError};

    const SIGNER: Ed25519Signer = Ed25519Signer;

    #[test]
    fn generate_signs_freezes_and_announces() {
        let fx = Fixture::new(100);
        let key = fx.create();
        assert!(key.as_str().starts_with("adv_media_ac1,ac2_100_"));

        let txn = Transaction::begin(&fx.store);
        let sc = get_contract(&txn, &key).unwrap();
        assert_eq!(sc.contract_signature.len(), 1);
        assert!(!sc.published);
        assert_eq!(txn.get_account(fx.id(0)).unwrap().assets, Amount::from_units(70));
        for (id, _) in &fx.keys {
            assert!(txn.exists(&StateKey::ConfirmIndex(id.clone())).unwrap());
        }
        assert!(txn.exists(&StateKey::Freeze(key)).unwrap());
    }

    #[test]
    fn insufficient_funds_publishes_nothing() {
        let fx = Fixture::new(10);
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());
        let mut txn = Transaction::begin(&fx.store);
        let err = registry
            .generate_contract(&mut txn, fx.id(0), fx.terms(), fx.key(0), Timestamp::new(100))
            .unwrap_err();
        assert!(matches!(err, ContractError::InsufficientFunds { .. }));
        assert_eq!(txn.pending_writes(), 0);
    }

    #[test]
    fn wrong_private_key_is_rejected() {
        let fx = Fixture::new(100);
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());
        let mut txn = Transaction::begin(&fx.store);
        let err = registry
            .generate_contract(&mut txn, fx.id(0), fx.terms(), fx.key(1), Timestamp::new(100))
            .unwrap_err();
        assert!(matches!(err, ContractError::SignatureInvalid { signer } if signer == *fx.id(0)));
    }

    #[test]
    fn only_advertisers_create_and_terms_are_checked() {
        let fx = Fixture::new(100);
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());
        let mut txn = Transaction::begin(&fx.store);
        let err = registry
            .generate_contract(&mut txn, fx.id(1), fx.terms(), fx.key(1), Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));

        let mut terms = fx.terms();
        terms.priorities.pop();
        let err = registry
            .generate_contract(&mut txn, fx.id(0), terms, fx.key(0), Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument(_)));

        let mut terms = fx.terms();
        terms.anti_cheat_ids[1] = fx.id(2).clone();
        assert!(registry
            .generate_contract(&mut txn, fx.id(0), terms, fx.key(0), Timestamp::new(1))
            .is_err());
    }

    #[test]
    fn signatures_accumulate_then_advertiser_publishes() {
        let fx = Fixture::new(100);
        let key = fx.create();

        assert!(matches!(
            fx.confirm(0, &key, false),
            Err(ContractError::ContractIncomplete { have: 1, need: 4 })
        ));
        assert_eq!(fx.confirm(1, &key, true).unwrap(), ConfirmOutcome::Signed { have: 2, need: 4 });
        // Re-signing replaces, never double counts.
        assert_eq!(fx.confirm(1, &key, true).unwrap(), ConfirmOutcome::Signed { have: 2, need: 4 });
        fx.confirm(2, &key, true).unwrap();
        assert_eq!(fx.confirm(3, &key, true).unwrap(), ConfirmOutcome::Signed { have: 4, need: 4 });

        assert_eq!(fx.confirm(0, &key, false).unwrap(), ConfirmOutcome::Published);
        assert_eq!(fx.confirm(0, &key, false).unwrap(), ConfirmOutcome::AlreadyPublished);

        let txn = Transaction::begin(&fx.store);
        assert!(get_contract(&txn, &key).unwrap().published);
        assert_eq!(fx.store.history(&StateKey::ContractIndex(fx.id(1).clone())).unwrap().count(), 1);
        assert!(!txn.exists(&StateKey::ContractIndex(fx.id(0).clone())).unwrap());
    }

    #[test]
    fn outsiders_cannot_sign() {
        let fx = Fixture::new(100);
        let key = fx.create();
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());
        let mut txn = Transaction::begin(&fx.store);
        let err = registry
            .confirm_contract(&mut txn, &PartyId::parse("mallory").unwrap(), &key, Some(fx.key(1)))
            .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));
    }

    #[test]
    fn tampered_signature_names_the_signer() {
        let fx = Fixture::new(100);
        let key = fx.create();
        fx.confirm(1, &key, true).unwrap();

        let txn = Transaction::begin(&fx.store);
        let mut sc = get_contract(&txn, &key).unwrap();
        drop(txn);
        let mut forged = sc.contract_signature.get(fx.id(1)).unwrap().clone();
        forged.0[0] ^= 0xff;
        sc.contract_signature.insert(fx.id(1).clone(), forged);
        fx.store.force_put(StateKey::Contract(key.clone()), serde_json::to_vec(&sc).unwrap());

        for signer in [2, 3, 0] {
            let err = fx.confirm(signer, &key, true).unwrap_err();
            assert!(matches!(err, ContractError::SignatureInvalid { ref signer } if signer == fx.id(1)));
        }
    }

    #[test]
    fn interleaved_confirmations_keep_every_signature() {
        let fx = Fixture::new(100);
        let key = fx.create();
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());

        let mut first = Transaction::begin(&fx.store);
        let mut second = Transaction::begin(&fx.store);
        let a = registry.confirm_contract(&mut first, fx.id(2), &key, Some(fx.key(2))).unwrap();
        let b = registry.confirm_contract(&mut second, fx.id(3), &key, Some(fx.key(3))).unwrap();
        assert_eq!(a, ConfirmOutcome::Signed { have: 2, need: 4 });
        assert_eq!(b, ConfirmOutcome::Signed { have: 2, need: 4 });

        first.commit(Timestamp::new(200)).unwrap();
        let err = ContractError::from(second.commit(Timestamp::new(200)).unwrap_err());
        assert!(matches!(err, ContractError::Store(StoreError::Conflict(_))));

        assert_eq!(fx.confirm(3, &key, true).unwrap(), ConfirmOutcome::Signed { have: 3, need: 4 });
        let txn = Transaction::begin(&fx.store);
        let sc = get_contract(&txn, &key).unwrap();
        assert!(sc.contract_signature.contains(fx.id(2)));
        assert!(sc.contract_signature.contains(fx.id(3)));
    }
}
