//! Participant roles.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role an account plays in advertising contracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Pays for the engagement; creates contracts and funds the escrow.
    Advertiser,
    /// Publishes the content and submits delivery logs.
    Media,
    /// Verifier organisation whose judgments are weighed at settlement.
    AntiCheat,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advertiser => "Advertiser",
            Self::Media => "Media",
            Self::AntiCheat => "AntiCheat",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "advertiser" => Ok(Self::Advertiser),
            "media" => Ok(Self::Media),
            "anticheat" | "anti-cheat" | "anti_cheat" => Ok(Self::AntiCheat),
            _ => Err(TypeError::UnknownRole(s.to_string())),
        }
    }
}
