//! Named operations and their argument parsing.

use crate::NodeError;
use adsettle_contract::ContractTerms;
use adsettle_store::ContractKey;
use adsettle_types::{PartyId, PrivateKey};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Every operation the engine exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    SetAccount,
    GeneratorContract,
    AdvertiserMediaAntiConfirm,
    MediaSubmit,
    AntiCheatConfirm,
    SettleAccount,
    AdvertiserChargeGet,
    GetContract,
    GetContractList,
    GetAllConfirmContractKey,
    GetLogList,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Self::SetAccount,
        Self::GeneratorContract,
        Self::AdvertiserMediaAntiConfirm,
        Self::MediaSubmit,
        Self::AntiCheatConfirm,
        Self::SettleAccount,
        Self::AdvertiserChargeGet,
        Self::GetContract,
        Self::GetContractList,
        Self::GetAllConfirmContractKey,
        Self::GetLogList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetAccount => "setAccount",
            Self::GeneratorContract => "generatorContract",
            Self::AdvertiserMediaAntiConfirm => "advertiserMediaAntiConfirm",
            Self::MediaSubmit => "mediaSubmit",
            Self::AntiCheatConfirm => "antiCheatConfirm",
            Self::SettleAccount => "settleAccount",
            Self::AdvertiserChargeGet => "advertiserChargeGet",
            Self::GetContract => "getContract",
            Self::GetContractList => "getContractList",
            Self::GetAllConfirmContractKey => "getAllConfirmContractKey",
            Self::GetLogList => "getLogList",
        }
    }

    /// Accepted argument counts.
    pub fn arity(self) -> RangeInclusive<usize> {
        match self {
            Self::SetAccount => 4..=4,
            Self::GeneratorContract => 8..=8,
            Self::AdvertiserMediaAntiConfirm => 1..=2,
            Self::MediaSubmit | Self::AntiCheatConfirm => 3..=3,
            Self::SettleAccount | Self::AdvertiserChargeGet | Self::GetContract => 1..=1,
            Self::GetContractList | Self::GetAllConfirmContractKey | Self::GetLogList => 0..=0,
        }
    }

    /// Whether the operation writes to the ledger.
    pub fn is_mutating(self) -> bool {
        !matches!(
            self,
            Self::GetContract | Self::GetContractList | Self::GetAllConfirmContractKey | Self::GetLogList
        )
    }

    pub fn check_arity(self, args: &[String]) -> Result<(), NodeError> {
        let arity = self.arity();
        if arity.contains(&args.len()) {
            return Ok(());
        }
        let expected = if arity.start() == arity.end() {
            arity.start().to_string()
        } else {
            format!("{} to {}", arity.start(), arity.end())
        };
        Err(NodeError::InvalidArgument(format!(
            "{self} expects {expected} arguments, got {}",
            args.len()
        )))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| NodeError::InvalidArgument(format!("unknown operation {s:?}")))
    }
}

/// Parse a value, reporting which argument was bad.
pub fn parse_arg<T>(name: &str, raw: &str) -> Result<T, NodeError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| NodeError::InvalidArgument(format!("{name}: {e}")))
}

/// A contract key, or a log key as listed by `getLogList`.
pub fn parse_contract_key(raw: &str) -> Result<ContractKey, NodeError> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("log/").unwrap_or(raw);
    ContractKey::parse(raw).map_err(NodeError::InvalidArgument)
}

pub fn parse_private_key(raw: &str) -> Result<PrivateKey, NodeError> {
    PrivateKey::from_hex(raw).map_err(|e| NodeError::InvalidArgument(format!("privateKey: {e}")))
}

/// Split a comma-separated list, rejecting empty items.
pub fn parse_list(name: &str, raw: &str) -> Result<Vec<String>, NodeError> {
    let items: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).collect();
    if items.iter().any(String::is_empty) {
        return Err(NodeError::InvalidArgument(format!("{name}: empty list item in {raw:?}")));
    }
    Ok(items)
}

/// `generatorContract` arguments, in order: mediaId, antiCheatIds,
/// paymentThreshold, paymentAmountMedia, paymentAmountAntiCheat, shareType,
/// priorities. The private key is parsed separately.
pub fn parse_terms(args: &[String]) -> Result<ContractTerms, NodeError> {
    let anti_cheat_ids = parse_list("antiCheatIds", &args[1])?
        .into_iter()
        .map(PartyId::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ContractTerms {
        media_id: parse_arg("mediaId", &args[0])?,
        anti_cheat_ids,
        payment_threshold: parse_arg("paymentThreshold", &args[2])?,
        payment_amount_media: parse_arg("paymentAmountMedia", &args[3])?,
        payment_amount_anti_cheat: parse_arg("paymentAmountAntiCheat", &args[4])?,
        share_type: args[5].trim().to_string(),
        priorities: parse_list("priorities", &args[6])?,
    })
}
