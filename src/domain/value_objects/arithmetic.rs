//! # Checked Arithmetic
//!
//! Traits and utilities for safe integer arithmetic on chain amounts.
//!
//! This module provides:
//! - [`ArithmeticError`] - Error type for arithmetic failures
//! - [`CheckedArithmetic`] - Trait for safe arithmetic operations
//! - [`mul_div`] - Multiply-then-divide for integer ratios
//!
//! All amounts on chain are unsigned integers in the smallest unit. Nothing
//! here goes through floating point, so every result is reproducible.
//!
//! # Examples
//!
//! ```
//! use vault_sweeper::domain::value_objects::arithmetic::{CheckedArithmetic, mul_div};
//!
//! let fee = 20_000_000_000u128.safe_mul(21_000).unwrap();
//! assert_eq!(fee, 420_000_000_000_000);
//!
//! // 20% buffer expressed as 120 / 100
//! assert_eq!(mul_div(10, 120, 100).unwrap(), 12);
//! ```

use thiserror::Error;

/// Error type for arithmetic operations.
///
/// Represents failures that can occur during checked arithmetic,
/// including overflow, underflow and division by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Arithmetic operation resulted in overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic operation resulted in underflow.
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero attempted.
    #[error("division by zero")]
    DivisionByZero,

    /// Invalid value provided (e.g., unparsable decimal amount).
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Multiplies `value` by `numerator` and divides by `denominator`.
///
/// The multiplication happens first so no precision is lost to an
/// intermediate truncation. The final division rounds down.
///
/// # Errors
///
/// Returns `ArithmeticError::Overflow` if `value * numerator` does not fit
/// in a `u128`, and `ArithmeticError::DivisionByZero` if `denominator` is zero.
#[inline]
#[must_use = "this returns the result of the operation, without modifying the original"]
pub fn mul_div(value: u128, numerator: u128, denominator: u128) -> ArithmeticResult<u128> {
    if denominator == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    value.safe_mul(numerator)?.safe_div(denominator)
}

/// Trait for checked arithmetic operations.
///
/// Provides safe arithmetic methods that return `Result` instead of
/// panicking on overflow, underflow, or division by zero.
pub trait CheckedArithmetic: Sized {
    /// Safely subtract two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Underflow` if the result would underflow.
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely multiply two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely divide two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::DivisionByZero` if the divisor is zero.
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for u128 {
    #[inline]
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_sub(rhs).ok_or(ArithmeticError::Underflow)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_mul(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_div(rhs).ok_or(ArithmeticError::DivisionByZero)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod arithmetic_error {
        use super::*;

        #[test]
        fn display_formats_correctly() {
            assert_eq!(ArithmeticError::Overflow.to_string(), "arithmetic overflow");
            assert_eq!(
                ArithmeticError::Underflow.to_string(),
                "arithmetic underflow"
            );
            assert_eq!(
                ArithmeticError::DivisionByZero.to_string(),
                "division by zero"
            );
            assert_eq!(
                ArithmeticError::InvalidValue("amount").to_string(),
                "invalid value: amount"
            );
        }
    }

    mod checked_u128 {
        use super::*;

        #[test]
        fn mul_overflow_is_reported() {
            assert_eq!(u128::MAX.safe_mul(2), Err(ArithmeticError::Overflow));
        }

        #[test]
        fn sub_underflow_is_reported() {
            assert_eq!(1u128.safe_sub(2), Err(ArithmeticError::Underflow));
        }

        #[test]
        fn div_by_zero_is_reported() {
            assert_eq!(1u128.safe_div(0), Err(ArithmeticError::DivisionByZero));
        }

        #[test]
        fn large_balance_times_price_fits() {
            // 10^30 wei at 10^6 gwei is still far from u128::MAX
            let product = 1_000_000_000_000_000_000_000_000_000_000u128
                .safe_mul(1_000_000_000_000_000)
                .unwrap();
            assert_eq!(product, 10u128.pow(45));
        }
    }

    mod ratio {
        use super::*;

        #[test]
        fn multiplies_before_dividing() {
            // 7 * 12 / 10 = 8 (dividing first would give 7)
            assert_eq!(mul_div(7, 12, 10).unwrap(), 8);
        }

        #[test]
        fn rounds_down() {
            assert_eq!(mul_div(10, 1, 3).unwrap(), 3);
        }

        #[test]
        fn zero_denominator() {
            assert_eq!(mul_div(10, 1, 0), Err(ArithmeticError::DivisionByZero));
        }

        #[test]
        fn overflow() {
            assert_eq!(mul_div(u128::MAX, 2, 1), Err(ArithmeticError::Overflow));
        }
    }
}
