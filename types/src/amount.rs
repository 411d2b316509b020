//! Payment-token amount type.
//!
//! Amounts are fixed-point integers (u128) in the token's smallest unit, so fee
//! arithmetic never touches floating point.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of the fungible payment token, in its smallest unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

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

    /// Parse a human decimal string (`"0.1"`, `"100"`) scaled by `decimals`.
    ///
    /// `parse_units("0.1", 18)` is `10^17`. More fractional digits than
    /// `decimals` is an error rather than a silent truncation.
    pub fn parse_units(value: &str, decimals: u32) -> Result<Self, TypesError> {
        let invalid = || TypesError::InvalidAmount(value.to_string());
        let (whole, frac) = match value.split_once('.') {
            Some((w, f)) => (w, f),
            None => (value, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > decimals as usize {
            return Err(invalid());
        }

        let scale = 10u128.checked_pow(decimals).ok_or_else(invalid)?;
        let whole_raw = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| invalid())?
        };
        let frac_raw = if frac.is_empty() {
            0
        } else {
            let pad = 10u128
                .checked_pow(decimals - frac.len() as u32)
                .ok_or_else(invalid)?;
            frac.parse::<u128>()
                .map_err(|_| invalid())?
                .checked_mul(pad)
                .ok_or_else(invalid)?
        };

        whole_raw
            .checked_mul(scale)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units_matches_eighteen_decimal_fee() {
        let fee = TokenAmount::parse_units("0.1", 18).unwrap();
        assert_eq!(fee.raw(), 100_000_000_000_000_000);
        let funding = TokenAmount::parse_units("100.0", 18).unwrap();
        assert_eq!(funding.raw(), 100 * 10u128.pow(18));
    }

    #[test]
    fn parse_units_accepts_bare_integers_and_leading_dot() {
        assert_eq!(TokenAmount::parse_units("42", 0).unwrap().raw(), 42);
        assert_eq!(TokenAmount::parse_units(".5", 1).unwrap().raw(), 5);
    }

    #[test]
    fn parse_units_rejects_garbage() {
        assert!(TokenAmount::parse_units("", 18).is_err());
        assert!(TokenAmount::parse_units(".", 18).is_err());
        assert!(TokenAmount::parse_units("1.2.3", 18).is_err());
        assert!(TokenAmount::parse_units("-1", 18).is_err());
        assert!(TokenAmount::parse_units("0.123", 2).is_err());
    }

    #[test]
    fn checked_sub_refuses_underflow() {
        let a = TokenAmount::new(5);
        assert_eq!(a.checked_sub(TokenAmount::new(6)), None);
        assert_eq!(a.checked_sub(TokenAmount::new(5)), Some(TokenAmount::ZERO));
    }
}
