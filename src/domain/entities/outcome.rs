//! # Sweep Outcomes
//!
//! Per-network outcomes of one sweep cycle. Used for reporting only.

use super::transaction::TxHash;
use crate::domain::value_objects::{Network, Wei};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a network was left alone this cycle. Both are expected, quiet outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Balance is below the configured minimum transfer amount.
    InsufficientBalance {
        /// Observed balance.
        balance: Wei,
        /// Configured minimum.
        minimum: Wei,
    },
    /// Balance does not cover the transfer's own gas cost.
    InsufficientForGas {
        /// Observed balance.
        balance: Wei,
        /// `unit_price * gas_limit`.
        max_gas_fee: Wei,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance { balance, minimum } => write!(
                f,
                "balance {} below minimum transfer amount {}",
                balance.to_ether_string(),
                minimum.to_ether_string()
            ),
            Self::InsufficientForGas {
                balance,
                max_gas_fee,
            } => write!(
                f,
                "balance {} does not cover gas fee {}",
                balance.to_ether_string(),
                max_gas_fee.to_ether_string()
            ),
        }
    }
}

/// Result of executing a transfer decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReceipt {
    /// Network the transfer ran on.
    pub network: Network,
    /// Amount forwarded to the vault (net of gas).
    pub amount_swept: Wei,
    /// Transaction hash; `None` in dry-run mode.
    pub transaction_hash: Option<TxHash>,
    /// Block the transfer was confirmed in; `None` in dry-run mode.
    pub confirmed_block: Option<u64>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl SweepReceipt {
    /// Creates the receipt of a transfer that was computed but not submitted.
    #[must_use]
    pub fn dry_run(network: Network, amount_swept: Wei) -> Self {
        Self {
            network,
            amount_swept,
            transaction_hash: None,
            confirmed_block: None,
            dry_run: true,
        }
    }
}

/// What happened on one network during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Network had no usable configuration and was skipped.
    Unconfigured {
        /// Why the configuration was rejected.
        reason: String,
    },
    /// Nothing to sweep.
    Skipped(SkipReason),
    /// Transfer computed (dry run) or confirmed on chain.
    Swept(SweepReceipt),
    /// Sweep failed; the next cycle starts over from scratch.
    Failed {
        /// Rendered error.
        error: String,
    },
}

/// Outcome for a single network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOutcome {
    /// The network.
    pub network: Network,
    /// What happened.
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

impl NetworkOutcome {
    /// Creates an outcome.
    #[must_use]
    pub fn new(network: Network, kind: OutcomeKind) -> Self {
        Self { network, kind }
    }

    /// Creates a failed outcome from any displayable error.
    #[must_use]
    pub fn failed(network: Network, error: impl fmt::Display) -> Self {
        Self::new(
            network,
            OutcomeKind::Failed {
                error: error.to_string(),
            },
        )
    }

    /// Returns true if value was (or would have been, in dry run) moved.
    #[must_use]
    pub fn is_swept(&self) -> bool {
        matches!(self.kind, OutcomeKind::Swept(_))
    }

    /// Returns true if the sweep failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.kind, OutcomeKind::Failed { .. })
    }
}

impl fmt::Display for NetworkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OutcomeKind::Unconfigured { reason } => {
                write!(f, "[{}] unconfigured: {}", self.network, reason)
            }
            OutcomeKind::Skipped(reason) => write!(f, "[{}] skipped: {}", self.network, reason),
            OutcomeKind::Swept(receipt) if receipt.dry_run => write!(
                f,
                "[{}] dry run: would sweep {} {}",
                self.network,
                receipt.amount_swept.to_ether_string(),
                self.network.native_symbol()
            ),
            OutcomeKind::Swept(receipt) => write!(
                f,
                "[{}] swept {} {} in tx {} (block {})",
                self.network,
                receipt.amount_swept.to_ether_string(),
                self.network.native_symbol(),
                receipt
                    .transaction_hash
                    .as_ref()
                    .map_or("-", TxHash::as_str),
                receipt
                    .confirmed_block
                    .map_or_else(|| "-".to_string(), |b| b.to_string())
            ),
            OutcomeKind::Failed { error } => write!(f, "[{}] failed: {}", self.network, error),
        }
    }
}

/// Ordered per-network outcomes of one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCycleResult {
    /// Identifier of the cycle, for correlating log lines.
    pub cycle_id: Uuid,
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// When the last network finished.
    pub finished_at: DateTime<Utc>,
    /// Outcomes in configured network order.
    pub outcomes: Vec<NetworkOutcome>,
}

impl SweepCycleResult {
    /// Number of networks that swept.
    #[must_use]
    pub fn swept_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_swept()).count()
    }

    /// Number of networks that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cycle(outcomes: Vec<NetworkOutcome>) -> SweepCycleResult {
        let now = Utc::now();
        SweepCycleResult {
            cycle_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            outcomes,
        }
    }

    #[test]
    fn counts() {
        let result = cycle(vec![
            NetworkOutcome::new(
                Network::Ethereum,
                OutcomeKind::Swept(SweepReceipt::dry_run(Network::Ethereum, Wei::new(5))),
            ),
            NetworkOutcome::failed(Network::Bsc, "rpc down"),
            NetworkOutcome::new(
                Network::Base,
                OutcomeKind::Skipped(SkipReason::InsufficientBalance {
                    balance: Wei::ZERO,
                    minimum: Wei::new(1),
                }),
            ),
        ]);
        assert_eq!(result.swept_count(), 1);
        assert_eq!(result.failed_count(), 1);
    }

    #[test]
    fn display_confirmed_sweep() {
        let outcome = NetworkOutcome::new(
            Network::Ethereum,
            OutcomeKind::Swept(SweepReceipt {
                network: Network::Ethereum,
                amount_swept: Wei::new(1_000_000_000_000_000_000),
                transaction_hash: Some(TxHash::new("0xabc")),
                confirmed_block: Some(42),
                dry_run: false,
            }),
        );
        assert_eq!(
            outcome.to_string(),
            "[ethereum] swept 1.000000000000000000 ETH in tx 0xabc (block 42)"
        );
    }

    #[test]
    fn serializes_flat_kind_tag() {
        let outcome = NetworkOutcome::failed(Network::Bsc, "boom");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["network"], "bsc");
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["error"], "boom");
    }
}
