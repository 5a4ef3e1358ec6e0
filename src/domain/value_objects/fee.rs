//! # Fees
//!
//! Fee estimate for a plain native-asset transfer and the optional
//! proportional price buffer.

use super::arithmetic::{ArithmeticResult, CheckedArithmetic, mul_div};
use super::wei::Wei;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gas consumed by a plain value transfer to an externally owned account.
pub const PLAIN_TRANSFER_GAS: u64 = 21_000;

/// Fee parameters for a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    /// Cost per gas unit in wei (legacy gas price or max fee per gas).
    pub unit_price: u128,
    /// Gas budget for the transfer.
    pub gas_limit: u64,
}

impl FeeEstimate {
    /// Creates a fee estimate.
    #[must_use]
    pub const fn new(unit_price: u128, gas_limit: u64) -> Self {
        Self {
            unit_price,
            gas_limit,
        }
    }

    /// Creates a fee estimate for a plain transfer at the given price.
    #[must_use]
    pub const fn plain_transfer(unit_price: u128) -> Self {
        Self::new(unit_price, PLAIN_TRANSFER_GAS)
    }

    /// Returns `unit_price * gas_limit`, the most the transfer can cost.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the product does not fit in a `u128`.
    pub fn max_gas_fee(&self) -> ArithmeticResult<Wei> {
        self.unit_price
            .safe_mul(u128::from(self.gas_limit))
            .map(Wei::new)
    }

    /// Returns a copy with the buffer applied to the unit price.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the buffered price overflows.
    pub fn with_buffer(self, buffer: FeeBuffer) -> ArithmeticResult<Self> {
        Ok(Self {
            unit_price: buffer.apply(self.unit_price)?,
            gas_limit: self.gas_limit,
        })
    }
}

impl fmt::Display for FeeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei x {} gas", self.unit_price, self.gas_limit)
    }
}

/// Proportional price buffer, in whole percent.
///
/// Applied as `price * (100 + percent) / 100`, multiply first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeBuffer {
    percent: u32,
}

impl FeeBuffer {
    /// No buffer.
    pub const NONE: Self = Self { percent: 0 };

    /// Creates a buffer of `percent` percent.
    #[must_use]
    pub const fn new(percent: u32) -> Self {
        Self { percent }
    }

    /// Applies the buffer to a price.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the intermediate product overflows.
    pub fn apply(&self, price: u128) -> ArithmeticResult<u128> {
        if self.percent == 0 {
            return Ok(price);
        }
        mul_div(price, 100 + u128::from(self.percent), 100)
    }
}
