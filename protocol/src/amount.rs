//! # Fixed-Point Amounts
//!
//! Every value the ledger tracks is an [`Amount`]: a non-negative count of
//! base units, where one whole token is `10^18` base units. There is no
//! floating point anywhere near money. Arithmetic is checked; a result that
//! does not fit in `u128` is reported, never wrapped.
//!
//! Decimal strings are parsed exactly. `"9.9"` is `9_900_000_000_000_000_000`
//! base units, and a string with more than 18 fractional digits is rejected
//! rather than rounded.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{DECIMALS, UNIT};

/// Errors produced when building or parsing an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The string is not a plain non-negative decimal number.
    #[error("invalid amount '{0}': expected a non-negative decimal number")]
    InvalidFormat(String),

    /// More fractional digits than the ledger can represent.
    #[error("invalid amount '{input}': at most {max} fractional digits are allowed")]
    TooManyDecimals {
        /// The rejected input.
        input: String,
        /// The maximum number of fractional digits.
        max: u8,
    },

    /// The value does not fit in 128 bits of base units.
    #[error("amount overflow")]
    Overflow,
}

/// A non-negative quantity of ledger units with 18 implied decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// Zero base units.
    pub const ZERO: Amount = Amount(0);

    /// The largest representable amount.
    pub const MAX: Amount = Amount(u128::MAX);

    /// Wraps a raw base-unit count.
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Returns the raw base-unit count.
    pub const fn base_units(self) -> u128 {
        self.0
    }

    /// Builds an amount from a whole number of tokens.
    pub fn from_tokens(tokens: u128) -> Result<Self, AmountError> {
        tokens
            .checked_mul(UNIT)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Returns `true` for zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Computes `floor(self * numerator / denominator)`.
    ///
    /// Exact for every input whose result fits: the quotient and remainder
    /// by `denominator` are scaled separately, so `self * numerator` is never
    /// formed. Returns `None` if the result overflows or the denominator is
    /// zero.
    pub fn mul_div_floor(self, numerator: u128, denominator: u128) -> Option<Amount> {
        if denominator == 0 {
            return None;
        }
        let quotient = self.0 / denominator;
        let remainder = self.0 % denominator;
        let high = quotient.checked_mul(numerator)?;
        let low = remainder.checked_mul(numerator)? / denominator;
        high.checked_add(low).map(Amount)
    }

    /// Splits the amount into two halves: `floor(self / 2)` and the rest.
    /// The second half is never smaller than the first and exceeds it by at
    /// most one base unit.
    pub fn split_half(self) -> (Amount, Amount) {
        let first = self.0 / 2;
        (Amount(first), Amount(self.0 - first))
    }

    /// Parses a decimal token string such as `"10"`, `"9.9"` or `"0.045"`.
    pub fn parse_decimal(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        let invalid = || AmountError::InvalidFormat(input.to_string());

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize {
            return Err(AmountError::TooManyDecimals {
                input: input.to_string(),
                max: DECIMALS,
            });
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| AmountError::Overflow)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let scale = 10u128.pow((DECIMALS as usize - frac.len()) as u32);
            frac.parse::<u128>().map_err(|_| invalid())? * scale
        };

        whole_units
            .checked_mul(UNIT)
            .and_then(|w| w.checked_add(frac_units))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }
}

impl fmt::Display for Amount {
    /// Renders as a decimal token string with trailing zeros trimmed:
    /// `9.9`, `0.045`, `100`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNIT;
        let frac = self.0 % UNIT;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0>width$}", frac, width = DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

// Human-readable formats get the base-unit count as a string so JSON readers
// without 128-bit integers do not lose precision. Binary formats get a u128.

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.0.to_string())
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a base-unit count as an integer or a string of digits")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(v as u128))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(Amount(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse::<u128>()
            .map(Amount)
            .map_err(|_| E::custom(format!("invalid base-unit count '{}'", v)))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(AmountVisitor)
        } else {
            deserializer.deserialize_u128(AmountVisitor)
        }
    }
}
