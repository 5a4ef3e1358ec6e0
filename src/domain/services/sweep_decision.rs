//! # Sweep Decision
//!
//! Pure skip-or-transfer decision for one balance.
//!
//! # Examples
//!
//! ```
//! use vault_sweeper::domain::services::sweep_decision::{decide, SweepDecision};
//! use vault_sweeper::domain::value_objects::{FeeEstimate, Wei};
//!
//! let decision = decide(
//!     Wei::new(1_000_000_000_000_000_000),
//!     FeeEstimate::plain_transfer(20_000_000_000),
//!     Wei::new(1_000_000_000_000_000),
//! )
//! .unwrap();
//! assert_eq!(decision, SweepDecision::Transfer(Wei::new(999_580_000_000_000_000)));
//! ```

use crate::domain::value_objects::{ArithmeticResult, FeeEstimate, Wei};
use serde::{Deserialize, Serialize};

/// What to do with a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDecision {
    /// Balance is below the minimum transfer amount.
    InsufficientBalance,
    /// Balance does not exceed the transfer's gas cost.
    InsufficientForGas,
    /// Forward this amount (balance net of gas, always > 0).
    Transfer(Wei),
}

impl SweepDecision {
    /// Returns the amount to forward, if any.
    #[must_use]
    pub const fn transfer_amount(&self) -> Option<Wei> {
        match self {
            Self::Transfer(amount) => Some(*amount),
            Self::InsufficientBalance | Self::InsufficientForGas => None,
        }
    }
}

/// Decides whether to sweep `balance`.
///
/// 1. `balance < min_transfer` skips quietly.
/// 2. `balance <= unit_price * gas_limit` cannot pay for itself.
/// 3. Otherwise the whole residual `balance - max_gas_fee` is forwarded.
///
/// # Errors
///
/// Returns `ArithmeticError::Overflow` if `unit_price * gas_limit` does not
/// fit in a `u128`. No value is truncated or rounded.
pub fn decide(balance: Wei, fee: FeeEstimate, min_transfer: Wei) -> ArithmeticResult<SweepDecision> {
    if !meets_minimum(balance, min_transfer) {
        return Ok(SweepDecision::InsufficientBalance);
    }

    let max_gas_fee = fee.max_gas_fee()?;
    if balance <= max_gas_fee {
        return Ok(SweepDecision::InsufficientForGas);
    }

    Ok(SweepDecision::Transfer(balance.safe_sub(max_gas_fee)?))
}

/// Returns true if `balance` is at least the minimum transfer amount.
///
/// Callers use this to skip the fee lookup entirely for dust balances.
#[must_use]
pub fn meets_minimum(balance: Wei, min_transfer: Wei) -> bool {
    balance >= min_transfer
}
