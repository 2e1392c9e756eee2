//! Escrow ledger: advertiser funds frozen against a contract.

use crate::error::ContractError;
use crate::model::{FreezeRecord, SignatureContract};
use adsettle_store::{AccountStore, ContractKey, StateKey, Transaction};
use adsettle_types::{Amount, PartyId, Timestamp};
use adsettle_utils::{format_duration, format_remaining};

/// Default time-lock on frozen funds: 7 days.
pub const DEFAULT_LOCK_SECS: u64 = 7 * 24 * 60 * 60;

/// Freezes and releases escrowed funds.
#[derive(Clone, Copy, Debug)]
pub struct EscrowLedger {
    lock_secs: u64,
}

impl Default for EscrowLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_SECS)
    }
}

impl EscrowLedger {
    pub fn new(lock_secs: u64) -> Self {
        Self { lock_secs }
    }

    pub fn lock_secs(&self) -> u64 {
        self.lock_secs
    }

    /// Debit `payer` and hold `amount` under `key` until `now + lock`.
    ///
    /// At most one freeze may exist per contract key.
    pub fn charge_and_freeze(
        &self,
        txn: &mut Transaction<'_>,
        payer: &PartyId,
        amount: Amount,
        key: &ContractKey,
        now: Timestamp,
    ) -> Result<FreezeRecord, ContractError> {
        let freeze_key = StateKey::Freeze(key.clone());
        if txn.exists(&freeze_key)? {
            return Err(ContractError::Duplicate(freeze_key.encode()));
        }

        let mut account = txn.get_account(payer)?;
        let available = account.assets;
        account.assets = available.checked_sub(amount).ok_or_else(|| {
            tracing::warn!(payer = %payer, needed = %amount, %available, "charge rejected");
            ContractError::InsufficientFunds {
                needed: amount,
                available,
            }
        })?;
        txn.put_account(payer, &account)?;

        let record = FreezeRecord {
            release_timestamp: now.plus_secs(self.lock_secs),
            amount,
            payer: payer.clone(),
        };
        txn.put_json(freeze_key, &record)?;
        tracing::info!(
            contract = %key,
            payer = %payer,
            amount = %amount,
            lock = %format_duration(self.lock_secs),
            "escrow frozen"
        );
        Ok(record)
    }

    /// Pay the frozen amount to `recipient` and clear the freeze.
    ///
    /// Fails with `FundsStillLocked` before the release time and `NotFound`
    /// once the freeze has been released.
    pub fn release_freeze(
        &self,
        txn: &mut Transaction<'_>,
        key: &ContractKey,
        recipient: &PartyId,
        now: Timestamp,
    ) -> Result<Amount, ContractError> {
        let freeze_key = StateKey::Freeze(key.clone());
        let record: FreezeRecord = txn.require_json(&freeze_key)?;
        if now < record.release_timestamp {
            return Err(ContractError::FundsStillLocked {
                release_at: record.release_timestamp,
                remaining: format_remaining(record.release_timestamp, now),
            });
        }

        let mut account = txn.get_account(recipient)?;
        account.assets = account
            .assets
            .checked_add(record.amount)
            .ok_or_else(|| ContractError::InvalidArgument("balance overflow".into()))?;
        txn.put_account(recipient, &account)?;
        txn.delete(freeze_key);
        tracing::info!(contract = %key, recipient = %recipient, amount = %record.amount, "escrow released");
        Ok(record.amount)
    }

    /// Release a contract's escrow to a party entitled to it: the media of a
    /// fully signed contract, or the advertiser of one that never got all its
    /// signatures.
    pub fn collect(
        &self,
        txn: &mut Transaction<'_>,
        caller: &PartyId,
        contract_key: &ContractKey,
        now: Timestamp,
    ) -> Result<Amount, ContractError> {
        let sc: SignatureContract = txn.require_json(&StateKey::Contract(contract_key.clone()))?;
        let entitled = if sc.is_fully_signed() {
            *caller == sc.contract.media_id
        } else {
            *caller == sc.contract.advertiser_id
        };
        if !entitled {
            return Err(ContractError::unauthorized(
                caller,
                format!("collect the escrow of {contract_key}"),
            ));
        }
        self.release_freeze(txn, contract_key, caller, now)
    }
}
