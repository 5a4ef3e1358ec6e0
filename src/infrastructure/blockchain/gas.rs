//! # Gas Pricing
//!
//! Turns the fee data reported by a node into a [`FeeEstimate`].
//!
//! Supports both legacy gas pricing and EIP-1559 dynamic fees: the legacy
//! price wins when present, otherwise the max fee per gas is used.

use super::client::{ChainError, ChainResult};
use crate::domain::value_objects::FeeEstimate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee data as reported by a node. Any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeData {
    /// Legacy gas price in wei.
    pub gas_price: Option<u128>,
    /// EIP-1559 maximum fee per gas in wei.
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 maximum priority fee per gas in wei.
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// Creates fee data from a legacy gas price only.
    #[must_use]
    pub const fn legacy(gas_price: u128) -> Self {
        Self {
            gas_price: Some(gas_price),
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        }
    }

    /// Creates fee data from EIP-1559 fees only.
    #[must_use]
    pub const fn eip1559(max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        Self {
            gas_price: None,
            max_fee_per_gas: Some(max_fee_per_gas),
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
        }
    }

    /// Returns the per-gas price used for cost estimation.
    ///
    /// A zero legacy price is treated as unavailable.
    #[must_use]
    pub fn unit_price(&self) -> Option<u128> {
        self.gas_price
            .filter(|price| *price > 0)
            .or(self.max_fee_per_gas)
    }

    /// Builds the fee estimate for a plain transfer.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Internal` if the node reported no usable price.
    pub fn to_estimate(&self) -> ChainResult<FeeEstimate> {
        self.unit_price()
            .map(FeeEstimate::plain_transfer)
            .ok_or_else(|| ChainError::internal("node reported neither gas price nor max fee"))
    }
}

impl fmt::Display for FeeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.gas_price, self.max_fee_per_gas) {
            (Some(gas_price), _) => write!(f, "legacy: {} wei", gas_price),
            (None, Some(max_fee)) => write!(
                f,
                "eip1559: max_fee={} wei, priority_fee={} wei",
                max_fee,
                self.max_priority_fee_per_gas.unwrap_or_default()
            ),
            (None, None) => write!(f, "unavailable"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PLAIN_TRANSFER_GAS;

    #[test]
    fn legacy_price_wins() {
        let data = FeeData {
            gas_price: Some(25_000_000_000),
            max_fee_per_gas: Some(50_000_000_000),
            max_priority_fee_per_gas: Some(2_000_000_000),
        };
        assert_eq!(data.unit_price(), Some(25_000_000_000));
    }

    #[test]
    fn falls_back_to_max_fee() {
        let data = FeeData::eip1559(50_000_000_000, 2_000_000_000);
        assert_eq!(data.unit_price(), Some(50_000_000_000));
    }

    #[test]
    fn zero_legacy_price_falls_back() {
        let data = FeeData {
            gas_price: Some(0),
            max_fee_per_gas: Some(3),
            max_priority_fee_per_gas: None,
        };
        assert_eq!(data.unit_price(), Some(3));
    }

    #[test]
    fn estimate_uses_plain_transfer_gas() {
        let estimate = FeeData::legacy(20_000_000_000).to_estimate().unwrap();
        assert_eq!(estimate.unit_price, 20_000_000_000);
        assert_eq!(estimate.gas_limit, PLAIN_TRANSFER_GAS);
    }

    #[test]
    fn no_price_is_an_error() {
        let err = FeeData::default().to_estimate().unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn display() {
        assert!(FeeData::legacy(1).to_string().contains("legacy"));
        assert!(FeeData::eip1559(2, 1).to_string().contains("eip1559"));
        assert_eq!(FeeData::default().to_string(), "unavailable");
    }
}
