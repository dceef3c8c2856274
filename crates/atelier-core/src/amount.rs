//! Fixed-point token amounts.
//!
//! USDT (TRC-20) and TRX both carry 6 decimal places on TRON; the native
//! smallest unit is the SUN (1 TRX = 1_000_000 SUN). [`Amount`] stores a
//! count of 10^-6 units in a `u64` and converts to and from decimal
//! strings with integer arithmetic only — no floating point on the
//! parse/store path, so `"12.345678"` is exactly 12_345_678 units.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AmountError;

/// Decimal places carried by USDT and TRX.
pub const TOKEN_DECIMALS: u32 = 6;

/// Smallest units per whole token (10^6).
pub const UNITS_PER_TOKEN: u64 = 1_000_000;

/// A non-negative token amount in 10^-6 smallest units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    /// Zero tokens.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a raw count of smallest units.
    pub const fn from_units(units: u64) -> Self {
        Amount(units)
    }

    /// The raw count of smallest units.
    pub const fn as_units(&self) -> u64 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Approximate `f64` value. Display and logging only — never feed the
    /// result back into amount arithmetic.
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / UNITS_PER_TOKEN as f64
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parse a decimal string such as `"10.5"` or `"12.345678"`.
    ///
    /// Rejects empty input, explicit signs, non-digit characters, more
    /// than 6 fractional digits, and magnitudes overflowing `u64`.
    fn from_str(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('+') || s.starts_with('-') {
            return Err(AmountError::SignNotAllowed(s.to_string()));
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::InvalidDigit(s.to_string()));
        }
        if frac_part.len() > TOKEN_DECIMALS as usize {
            return Err(AmountError::TooManyDecimals {
                got: frac_part.len(),
                max: TOKEN_DECIMALS as usize,
            });
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::InvalidDigit(s.to_string()));
        }

        let int_units = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse::<u64>()
                .map_err(|_| AmountError::Overflow)?
                .checked_mul(UNITS_PER_TOKEN)
                .ok_or(AmountError::Overflow)?
        };

        let frac_units = if frac_part.is_empty() {
            0
        } else {
            // "05" is 5 hundredths of a token: scale by position, not value
            let digits = frac_part
                .parse::<u64>()
                .map_err(|_| AmountError::InvalidDigit(s.to_string()))?;
            digits * 10u64.pow(TOKEN_DECIMALS - frac_part.len() as u32)
        };

        int_units
            .checked_add(frac_units)
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac_str = format!("{frac:06}");
            write!(f, "{whole}.{}", frac_str.trim_end_matches('0'))
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
