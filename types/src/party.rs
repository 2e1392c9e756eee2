//! Party identity type.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a contract participant (advertiser, media or anti-cheat org).
///
/// Ids are non-empty and contain no whitespace, no control characters and not
/// the `/` separator used by the typed state keys, so one party can never
/// address another party's namespace. The LMDB history index also relies on
/// ids never holding a NUL byte.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyId(String);

impl PartyId {
    /// Separator reserved by the key builder.
    pub const RESERVED: char = '/';

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypeError> {
        let s = raw.into();
        if s.is_empty()
            || s.contains(Self::RESERVED)
            || s.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(TypeError::InvalidPartyId(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PartyId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<PartyId> for String {
    fn from(id: PartyId) -> Self {
        id.0
    }
}

impl std::str::FromStr for PartyId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_ids() {
        assert_eq!(PartyId::parse("media-1").unwrap().as_str(), "media-1");
        assert!(PartyId::parse("org_a.b").is_ok());
    }

    #[test]
    fn rejects_reserved_and_blank() {
        assert!(PartyId::parse("").is_err());
        assert!(PartyId::parse("a/b").is_err());
        assert!(PartyId::parse("a b").is_err());
        assert!(PartyId::parse("a\n").is_err());
    }

    #[test]
    fn rejects_control_characters() {
        assert!(PartyId::parse("a\0").is_err());
        assert!(PartyId::parse("\u{1b}[31m").is_err());
        assert!(PartyId::parse("ac\u{7f}").is_err());
        assert!(serde_json::from_str::<PartyId>("\"a\\u0000b\"").is_err());
    }

    #[test]
    fn serde_validates() {
        let ok: PartyId = serde_json::from_str("\"adv\"").unwrap();
        assert_eq!(ok.as_str(), "adv");
        assert!(serde_json::from_str::<PartyId>("\"x/y\"").is_err());
    }
}
