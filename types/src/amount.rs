//! Decimal amount types for balances and reputation.
//!
//! Amounts use `rust_decimal::Decimal` rather than floats so that escrow
//! charges and releases conserve value exactly.

use crate::TypeError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A non-negative asset balance or payment amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, TypeError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TypeError::InvalidAmount {
                value: value.to_string(),
                reason: "amount must not be negative".into(),
            });
        }
        Ok(Self(value.normalize()))
    }

    /// Whole units, mostly for tests and fixtures.
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(|v| Self(v.normalize()))
    }

    /// Subtract, returning `None` if the result would be negative.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if other.0 > self.0 {
            return None;
        }
        self.0.checked_sub(other.0).map(|v| Self(v.normalize()))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = TypeError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(a: Amount) -> Self {
        a.0
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| TypeError::InvalidAmount {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed reputation score. Settlement can push it below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credit(Decimal);

impl Credit {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value.normalize())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Apply a settlement delta, `None` on decimal overflow.
    pub fn checked_add(self, delta: Decimal) -> Option<Self> {
        self.0.checked_add(delta).map(Self::new)
    }
}

impl FromStr for Credit {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self::new)
            .map_err(|e| TypeError::InvalidAmount {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
