//! Account records and their storage helpers.

use crate::{StateKey, StoreError, Transaction};
use adsettle_types::{Amount, Credit, PartyId, PublicKey, Role};
use serde::{Deserialize, Serialize};

/// Per-party state: role, reputation, balance and signing key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "type")]
    pub role: Role,
    /// Reputation score; may be negative.
    pub credit: Credit,
    /// Spendable balance.
    pub assets: Amount,
    /// Key every signature by this party is checked against.
    pub public_key: PublicKey,
}

/// Trait for account storage operations.
pub trait AccountStore {
    fn get_account(&self, id: &PartyId) -> Result<Account, StoreError>;
    fn put_account(&mut self, id: &PartyId, account: &Account) -> Result<(), StoreError>;
}

impl AccountStore for Transaction<'_> {
    fn get_account(&self, id: &PartyId) -> Result<Account, StoreError> {
        self.require_json(&StateKey::Account(id.clone()))
    }

    fn put_account(&mut self, id: &PartyId, account: &Account) -> Result<(), StoreError> {
        self.put_json(StateKey::Account(id.clone()), account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_original_field_names() {
        let account = Account {
            role: Role::Media,
            credit: "-2.5".parse().unwrap(),
            assets: "10".parse().unwrap(),
            public_key: PublicKey([1u8; 32]),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["type"], "Media");
        assert_eq!(value["credit"], "-2.5");
        assert_eq!(value["assets"], "10");
        assert!(value["publicKey"].is_string());
        let back: Account = serde_json::from_value(value).unwrap();
        assert_eq!(back, account);
    }
}
