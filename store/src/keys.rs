//! Typed state keys.
//!
//! Every record lives under `<namespace>/<id>`. Party ids and contract keys
//! may not contain `/`, so a key built for one namespace can never alias a
//! key in another.

use adsettle_types::{PartyId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic key of a contract.
///
/// Format: `advertiser_media_ac1,ac2_timestamp_fingerprint`. The fingerprint is
/// derived from the contract's canonical bytes by the caller.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractKey(String);

impl ContractKey {
    pub fn derive(
        advertiser: &PartyId,
        media: &PartyId,
        anti_cheat_ids: &[PartyId],
        timestamp: Timestamp,
        fingerprint: &str,
    ) -> Self {
        let verifiers = anti_cheat_ids
            .iter()
            .map(PartyId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        Self(format!(
            "{advertiser}_{media}_{verifiers}_{}_{fingerprint}",
            timestamp.as_secs()
        ))
    }

    /// Accept a key supplied by a caller.
    pub fn parse(raw: impl Into<String>) -> Result<Self, String> {
        let s = raw.into();
        if s.is_empty() || s.contains('/') || s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(format!("invalid contract key: {s:?}"));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContractKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<ContractKey> for String {
    fn from(k: ContractKey) -> Self {
        k.0
    }
}

/// Every key the engine reads or writes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    /// A party's account record.
    Account(PartyId),
    /// The signature contract itself.
    Contract(ContractKey),
    /// Per-party feed of contracts awaiting that party's signature.
    ConfirmIndex(PartyId),
    /// Per-party feed of fully signed, published contracts.
    ContractIndex(PartyId),
    /// The media log submission for a contract.
    Log(ContractKey),
    /// Per-verifier feed of logs awaiting confirmation.
    LogIndex(PartyId),
    /// Escrowed advertiser funds for a contract.
    Freeze(ContractKey),
    /// Settlement marker; present once a contract is settled.
    Settled(ContractKey),
}

impl StateKey {
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Contract(_) => "contract",
            Self::ConfirmIndex(_) => "confirm",
            Self::ContractIndex(_) => "published",
            Self::Log(_) => "log",
            Self::LogIndex(_) => "logindex",
            Self::Freeze(_) => "freeze",
            Self::Settled(_) => "settled",
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Account(id)
            | Self::ConfirmIndex(id)
            | Self::ContractIndex(id)
            | Self::LogIndex(id) => id.as_str(),
            Self::Contract(key) | Self::Log(key) | Self::Freeze(key) | Self::Settled(key) => {
                key.as_str()
            }
        }
    }

    /// Backend key string.
    pub fn encode(&self) -> String {
        format!("{}/{}", self.namespace(), self.id())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PartyId {
        PartyId::parse(s).unwrap()
    }

    #[test]
    fn contract_key_format() {
        let key = ContractKey::derive(
            &pid("adv"),
            &pid("media"),
            &[pid("ac1"), pid("ac2")],
            Timestamp::new(1_700_000_000),
            "00ff00ff00ff00ff",
        );
        assert_eq!(key.as_str(), "adv_media_ac1,ac2_1700000000_00ff00ff00ff00ff");
    }

    #[test]
    fn namespaces_do_not_alias() {
        let id = pid("alice");
        let keys = [
            StateKey::Account(id.clone()),
            StateKey::ConfirmIndex(id.clone()),
            StateKey::ContractIndex(id.clone()),
            StateKey::LogIndex(id),
        ];
        let encoded: std::collections::HashSet<_> = keys.iter().map(StateKey::encode).collect();
        assert_eq!(encoded.len(), keys.len());
        assert_eq!(keys[1].encode(), "confirm/alice");
    }

    #[test]
    fn contract_key_rejects_separator() {
        assert!(ContractKey::parse("a/b").is_err());
        assert!(ContractKey::parse("").is_err());
        assert!(ContractKey::parse("adv\0media").is_err());
        assert!(ContractKey::parse("adv_media_ac_1_ff").is_ok());
    }
}
