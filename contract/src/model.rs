//! Records persisted by the contract workflow.
//!
//! Field names follow the ledger's JSON layout (`advertiserId`, `timeStamp`,
//! ...). The canonical bytes a party signs are the compact JSON encoding of
//! [`Contract`] or of a [`Log`]'s base fields; serde emits struct fields in
//! declaration order, so the encoding is stable.

use crate::error::ContractError;
use adsettle_store::ContractKey;
use adsettle_types::{Amount, PartyId, Signature, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payment terms and participants of one advertising campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub advertiser_id: PartyId,
    pub media_id: PartyId,
    /// Verifiers in priority order.
    pub anti_cheat_ids: Vec<PartyId>,
    pub payment_threshold: Amount,
    pub payment_amount_media: Amount,
    pub payment_amount_anti_cheat: Amount,
    pub anti_cheat_share_type: String,
    /// Vote weights, parallel to `anti_cheat_ids`, kept as given.
    pub anti_cheat_priority: Vec<String>,
    pub time_stamp: Timestamp,
}

impl Contract {
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, ContractError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Signatures needed before the contract is binding.
    pub fn required_signatures(&self) -> usize {
        self.anti_cheat_ids.len() + 2
    }

    pub fn is_verifier(&self, party: &PartyId) -> bool {
        self.anti_cheat_ids.contains(party)
    }

    pub fn is_participant(&self, party: &PartyId) -> bool {
        *party == self.advertiser_id || *party == self.media_id || self.is_verifier(party)
    }

    /// Everyone who signs: advertiser, media, then verifiers.
    pub fn participants(&self) -> impl Iterator<Item = &PartyId> {
        [&self.advertiser_id, &self.media_id]
            .into_iter()
            .chain(self.anti_cheat_ids.iter())
    }

    /// Parse the priority strings as vote weights.
    pub fn priority_weights(&self) -> Result<Vec<f64>, ContractError> {
        parse_priorities(&self.anti_cheat_priority)
    }
}

pub(crate) fn parse_priorities(raw: &[String]) -> Result<Vec<f64>, ContractError> {
    raw.iter()
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite())
                .ok_or_else(|| ContractError::InvalidArgument(format!("bad priority {p:?}")))
        })
        .collect()
}

/// Detached signatures keyed by signer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractSignature(BTreeMap<PartyId, Signature>);

impl ContractSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry of `signer`.
    pub fn insert(&mut self, signer: PartyId, signature: Signature) {
        self.0.insert(signer, signature);
    }

    pub fn get(&self, signer: &PartyId) -> Option<&Signature> {
        self.0.get(signer)
    }

    pub fn contains(&self, signer: &PartyId) -> bool {
        self.0.contains_key(signer)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartyId, &Signature)> {
        self.0.iter()
    }
}

/// A contract with the signatures collected so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureContract {
    pub contract: Contract,
    pub contract_signature: ContractSignature,
    /// Set once the advertiser has published the fully signed contract.
    #[serde(default)]
    pub published: bool,
}

impl SignatureContract {
    pub fn is_fully_signed(&self) -> bool {
        self.contract_signature.len() == self.contract.required_signatures()
    }
}

/// Where one verifier put its result file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub anti_cheat_id: PartyId,
    pub address: String,
}

/// Media's evidence submission and the verifier results gathered against it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: String,
    pub time_stamp: Timestamp,
    pub anti_cheat_num: usize,
    #[serde(default)]
    pub anti_cheat_result_address: Vec<ResultEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogHeader<'a> {
    address: &'a str,
    time_stamp: Timestamp,
    anti_cheat_num: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ResultEntry>,
}

impl Log {
    fn header(&self) -> LogHeader<'_> {
        LogHeader {
            address: &self.address,
            time_stamp: self.time_stamp,
            anti_cheat_num: self.anti_cheat_num,
            result: None,
        }
    }

    /// Bytes the media signature covers. The result list is excluded, so
    /// the media signature stays valid as verifiers confirm.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, ContractError> {
        Ok(serde_json::to_vec(&self.header())?)
    }

    /// Bytes a verifier signs: the log header plus that verifier's own
    /// result entry. Other verifiers' entries are not covered.
    pub fn result_signing_bytes(&self, entry: &ResultEntry) -> Result<Vec<u8>, ContractError> {
        Ok(serde_json::to_vec(&LogHeader {
            result: Some(entry),
            ..self.header()
        })?)
    }

    pub fn is_complete(&self) -> bool {
        self.anti_cheat_result_address.len() == self.anti_cheat_num
    }

    pub fn result_of(&self, verifier: &PartyId) -> Option<&ResultEntry> {
        self.anti_cheat_result_address
            .iter()
            .find(|r| r.anti_cheat_id == *verifier)
    }
}

/// A log plus the media signature and one signature per confirming verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLogSubmit {
    pub log: Log,
    pub contract_signature: ContractSignature,
}

/// Funds held against a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeRecord {
    pub release_timestamp: Timestamp,
    pub amount: Amount,
    pub payer: PartyId,
}

/// Entry written to a party's confirm or published-contract feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractNotice {
    pub contract_key: ContractKey,
    pub advertiser_id: PartyId,
}

/// Entry written to a verifier's log feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogNotice {
    pub log_key: String,
    pub contract_key: ContractKey,
    pub media_id: PartyId,
}
