//! # Wei
//!
//! Native-asset amount in the smallest indivisible unit.

use super::arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
use ethers::types::U256;
use ethers::utils::{format_ether, parse_ether};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of native asset in its smallest unit (wei on EVM chains).
///
/// Backed by a `u128`, which covers every realistic account balance.
/// All arithmetic is checked; nothing is ever rounded through a float.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(u128);

impl Wei {
    /// Zero wei.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw wei value.
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the raw wei value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Parses a decimal whole-unit amount such as `"0.001"`.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::InvalidValue` if the string is not a valid
    /// decimal with at most 18 fractional digits or is negative, or
    /// `ArithmeticError::Overflow` if the result does not fit in a `u128`.
    pub fn from_ether_str(value: &str) -> ArithmeticResult<Self> {
        let value = value.trim();
        if value.starts_with('-') {
            return Err(ArithmeticError::InvalidValue("negative native amount"));
        }
        let parsed = parse_ether(value)
            .map_err(|_| ArithmeticError::InvalidValue("decimal native amount"))?;
        Self::try_from(parsed)
    }

    /// Formats the amount in whole units with all 18 decimals.
    #[must_use]
    pub fn to_ether_string(&self) -> String {
        format_ether(U256::from(self.0))
    }

    /// Safely subtracts another amount.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Underflow` if `rhs` is larger than `self`.
    pub fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.0.safe_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Wei> for U256 {
    fn from(value: Wei) -> Self {
        U256::from(value.0)
    }
}

impl TryFrom<U256> for Wei {
    type Error = ArithmeticError;

    fn try_from(value: U256) -> ArithmeticResult<Self> {
        if value > U256::from(u128::MAX) {
            return Err(ArithmeticError::Overflow);
        }
        Ok(Self(value.as_u128()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_threshold() {
        let min = Wei::from_ether_str("0.001").unwrap();
        assert_eq!(min.get(), 1_000_000_000_000_000);
    }

    #[test]
    fn parses_whole_units() {
        assert_eq!(
            Wei::from_ether_str("2").unwrap().get(),
            2_000_000_000_000_000_000
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Wei::from_ether_str("abc"),
            Err(ArithmeticError::InvalidValue(_))
        ));
    }

    #[test]
    fn rejects_negative_amount() {
        assert_eq!(
            Wei::from_ether_str(" -1"),
            Err(ArithmeticError::InvalidValue("negative native amount"))
        );
        assert_eq!(
            Wei::from_ether_str("-0.001").unwrap_err().to_string(),
            "invalid value: negative native amount"
        );
    }

    #[test]
    fn formats_in_whole_units() {
        let one = Wei::new(1_000_000_000_000_000_000);
        assert_eq!(one.to_ether_string(), "1.000000000000000000");
    }

    #[test]
    fn u256_above_u128_is_rejected() {
        let too_big = U256::from(u128::MAX) + U256::one();
        assert_eq!(Wei::try_from(too_big), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn safe_sub_underflow() {
        assert_eq!(
            Wei::new(1).safe_sub(Wei::new(2)),
            Err(ArithmeticError::Underflow)
        );
    }

    #[test]
    fn display_is_raw_wei() {
        assert_eq!(Wei::new(42).to_string(), "42 wei");
    }
}
