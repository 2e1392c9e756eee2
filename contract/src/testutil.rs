//! Shared fixture for the unit tests of this crate.

use crate::accounts::set_account;
use crate::error::ContractError;
use crate::escrow::EscrowLedger;
use crate::registry::{ConfirmOutcome, ContractRegistry, ContractTerms};
use crate::submission::SubmissionProtocol;
use adsettle_crypto::{keypair_from_seed, Ed25519Signer};
use adsettle_nullables::NullStateStore;
use adsettle_store::{ContractKey, Transaction};
use adsettle_types::{Amount, Credit, KeyPair, PartyId, PrivateKey, Role, Timestamp};

const SIGNER: Ed25519Signer = Ed25519Signer;

/// Advertiser `adv`, media `media`, verifiers `ac1` and `ac2`, indexed 0..4.
pub struct Fixture {
    pub store: NullStateStore,
    pub keys: Vec<(PartyId, KeyPair)>,
}

impl Fixture {
    pub fn new(advertiser_assets: u64) -> Self {
        let store = NullStateStore::new();
        let parties = [
            ("adv", Role::Advertiser),
            ("media", Role::Media),
            ("ac1", Role::AntiCheat),
            ("ac2", Role::AntiCheat),
        ];
        let mut keys = Vec::new();
        let mut txn = Transaction::begin(&store);
        for (i, (id, role)) in parties.into_iter().enumerate() {
            let id = PartyId::parse(id).unwrap();
            let kp = keypair_from_seed(&[i as u8 + 1; 32]);
            let assets = if role == Role::Advertiser { advertiser_assets } else { 0 };
            set_account(&mut txn, &id, role, Credit::ZERO, Amount::from_units(assets), kp.public.clone())
                .unwrap();
            keys.push((id, kp));
        }
        txn.commit(Timestamp::new(0)).unwrap();
        Self { store, keys }
    }

    pub fn id(&self, i: usize) -> &PartyId {
        &self.keys[i].0
    }

    pub fn key(&self, i: usize) -> &PrivateKey {
        &self.keys[i].1.private
    }

    pub fn terms(&self) -> ContractTerms {
        ContractTerms {
            media_id: self.id(1).clone(),
            anti_cheat_ids: vec![self.id(2).clone(), self.id(3).clone()],
            payment_threshold: Amount::from_units(1_000),
            payment_amount_media: Amount::from_units(30),
            payment_amount_anti_cheat: Amount::from_units(6),
            share_type: "byRight".into(),
            priorities: vec!["1".into(), "1".into()],
        }
    }

    pub fn create(&self) -> ContractKey {
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());
        let mut txn = Transaction::begin(&self.store);
        let key = registry
            .generate_contract(&mut txn, self.id(0), self.terms(), self.key(0), Timestamp::new(100))
            .unwrap();
        txn.commit(Timestamp::new(100)).unwrap();
        key
    }

    pub fn confirm(
        &self,
        i: usize,
        contract: &ContractKey,
        with_key: bool,
    ) -> Result<ConfirmOutcome, ContractError> {
        let registry = ContractRegistry::new(&SIGNER, EscrowLedger::default());
        let mut txn = Transaction::begin(&self.store);
        let key = with_key.then(|| self.key(i));
        let outcome = registry.confirm_contract(&mut txn, self.id(i), contract, key)?;
        txn.commit(Timestamp::new(200))?;
        Ok(outcome)
    }

    /// Create, co-sign by everyone and publish.
    pub fn published(&self) -> ContractKey {
        let key = self.create();
        for i in 1..4 {
            self.confirm(i, &key, true).unwrap();
        }
        assert_eq!(self.confirm(0, &key, false).unwrap(), ConfirmOutcome::Published);
        key
    }

    pub fn submit(&self, i: usize, contract: &ContractKey, address: &str) -> Result<(), ContractError> {
        let mut txn = Transaction::begin(&self.store);
        SubmissionProtocol::new(&SIGNER).submit_media_log(
            &mut txn,
            self.id(i),
            contract,
            address,
            self.key(i),
            Timestamp::new(300),
        )?;
        txn.commit(Timestamp::new(300))?;
        Ok(())
    }

    pub fn verify(
        &self,
        i: usize,
        contract: &ContractKey,
        address: &str,
    ) -> Result<(usize, usize), ContractError> {
        let mut txn = Transaction::begin(&self.store);
        let progress = SubmissionProtocol::new(&SIGNER).confirm_anti_cheat_result(
            &mut txn,
            self.id(i),
            contract,
            address,
            self.key(i),
        )?;
        txn.commit(Timestamp::new(400))?;
        Ok(progress)
    }
}
