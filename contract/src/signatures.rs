//! Signing and re-verification against the signers' account keys.

use crate::error::ContractError;
use crate::model::ContractSignature;
use adsettle_crypto::Signer;
use adsettle_store::{AccountStore, StoreError, Transaction};
use adsettle_types::{PartyId, PrivateKey, Signature};

/// Re-check every collected signature over `message`.
///
/// Fails on the first signer that is not `allowed`, has no account, or whose
/// signature does not verify under the account's public key.
pub fn verify_all(
    txn: &Transaction<'_>,
    signer: &dyn Signer,
    message: &[u8],
    signatures: &ContractSignature,
    allowed: impl Fn(&PartyId) -> bool,
) -> Result<(), ContractError> {
    verify_each(txn, signer, signatures, |party| {
        Ok(allowed(party).then(|| message.to_vec()))
    })
}

/// Re-check every collected signature against the message `message_for`
/// builds for its signer. A `None` message rejects that signer.
pub fn verify_each(
    txn: &Transaction<'_>,
    signer: &dyn Signer,
    signatures: &ContractSignature,
    message_for: impl Fn(&PartyId) -> Result<Option<Vec<u8>>, ContractError>,
) -> Result<(), ContractError> {
    for (party, signature) in signatures.iter() {
        let invalid = || ContractError::SignatureInvalid {
            signer: party.clone(),
        };
        let Some(message) = message_for(party)? else {
            return Err(invalid());
        };
        let account = match txn.get_account(party) {
            Ok(account) => account,
            Err(StoreError::NotFound(_)) => return Err(invalid()),
            Err(e) => return Err(e.into()),
        };
        if !signer.verify(&message, signature, &account.public_key) {
            tracing::warn!(signer = %party, "stored signature failed verification");
            return Err(invalid());
        }
    }
    Ok(())
}

/// Sign `message` as `party` and check the result against the party's
/// registered key, so a wrong private key is caught before anything is stored.
pub fn sign_as(
    txn: &Transaction<'_>,
    signer: &dyn Signer,
    party: &PartyId,
    message: &[u8],
    key: &PrivateKey,
) -> Result<Signature, ContractError> {
    let account = txn.get_account(party)?;
    let signature = signer.sign(message, key);
    if !signer.verify(message, &signature, &account.public_key) {
        return Err(ContractError::SignatureInvalid {
            signer: party.clone(),
        });
    }
    Ok(signature)
}
