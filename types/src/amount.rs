//! Currency amounts in the smallest unit (wei).
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! 1 ether = 10^18 wei.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits in one ether.
pub const ETHER_DECIMALS: usize = 18;

/// An amount of currency in wei.
///
/// Serialized as a decimal string: TOML integers are 64-bit and JSON clients
/// routinely lose precision above 2^53.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Self = Self(0);

    /// One ether in wei.
    pub const ETHER: Self = Self(1_000_000_000_000_000_000);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_mul(self, factor: u128) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `floor(self * numerator / denominator)`, exact for every `self`.
    ///
    /// Splits `self` into quotient and remainder by `denominator` so the
    /// product never leaves `u128` when `numerator <= denominator`. Returns
    /// `None` on a zero denominator or when the result itself overflows.
    pub fn mul_div_floor(self, numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let whole = (self.0 / denominator).checked_mul(numerator)?;
        let part = (self.0 % denominator).checked_mul(numerator)? / denominator;
        whole.checked_add(part).map(Self)
    }
}

fn parse_ether(amount: &str, input: &str) -> Result<u128, TypesError> {
    let invalid = |why: &str| TypesError::InvalidAmount(format!("{input}: {why}"));
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(invalid("more than 18 fractional digits"));
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("overflow"))?
    };
    let frac: u128 = format!("{frac:0<width$}", width = ETHER_DECIMALS)
        .parse()
        .map_err(|_| invalid("overflow"))?;
    whole
        .checked_mul(Wei::ETHER.0)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| invalid("overflow"))
}

impl FromStr for Wei {
    type Err = TypesError;

    /// Parse a raw wei integer (`"10000000000000000"`) or a decimal ether
    /// amount with an `eth`/`ether` suffix (`"0.01eth"`, `"1.5 ether"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let ether = trimmed
            .strip_suffix("ether")
            .or_else(|| trimmed.strip_suffix("eth"));
        match ether {
            Some(amount) => parse_ether(amount.trim_end(), s).map(Self),
            None => trimmed
                .parse::<u128>()
                .map(Self)
                .map_err(|e| TypesError::InvalidAmount(format!("{s}: {e}"))),
        }
    }
}

impl TryFrom<String> for Wei {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Wei> for String {
    fn from(amount: Wei) -> Self {
        amount.0.to_string()
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}
