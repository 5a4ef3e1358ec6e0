//! # Application Errors
//!
//! Error types for a single network's sweep.
//!
//! # Error Hierarchy
//!
//! ```text
//! SweepError
//! ├── Unconfigured(Unconfigured)   - Network has no usable entry
//! ├── Chain(ChainError)            - Non-retryable chain failure
//! ├── RetriesExhausted { .. }      - Transient failures on every attempt
//! ├── Arithmetic(ArithmeticError)  - Fee or amount out of range
//! └── Reverted { .. }              - Transfer mined but failed
//! ```
//!
//! # Examples
//!
//! ```
//! use vault_sweeper::application::error::SweepError;
//! use vault_sweeper::infrastructure::blockchain::ChainError;
//!
//! let err: SweepError = ChainError::rejected("nonce too low").into();
//! assert_eq!(err.to_string(), "chain error: request rejected: nonce too low");
//! ```

use crate::application::services::retry::RetryError;
use crate::domain::entities::TxHash;
use crate::domain::services::Unconfigured;
use crate::domain::value_objects::ArithmeticError;
use crate::infrastructure::blockchain::ChainError;
use thiserror::Error;

/// Failure of one network's sweep.
///
/// Always contained to that network's outcome; never aborts a cycle.
#[derive(Debug, Clone, Error)]
pub enum SweepError {
    /// Network is not configured.
    #[error(transparent)]
    Unconfigured(#[from] Unconfigured),

    /// Chain call failed with a non-retryable error.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// Every allowed attempt failed with a transient error.
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Operation name.
        operation: &'static str,
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        #[source]
        last: ChainError,
    },

    /// Fee or amount computation overflowed.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// Transfer was mined but reverted.
    #[error("transaction {tx_hash} reverted{}", in_block(.block))]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
        /// Block it was mined in, if known.
        block: Option<u64>,
    },
}

impl SweepError {
    /// Creates a reverted transaction error.
    #[must_use]
    pub fn reverted(tx_hash: TxHash, block: Option<u64>) -> Self {
        Self::Reverted { tx_hash, block }
    }
}

impl From<RetryError<ChainError>> for SweepError {
    fn from(err: RetryError<ChainError>) -> Self {
        match err {
            RetryError::Exhausted {
                operation,
                attempts,
                last,
            } => Self::RetriesExhausted {
                operation,
                attempts,
                last,
            },
            RetryError::Fatal { error, .. } => Self::Chain(error),
        }
    }
}

fn in_block(block: &Option<u64>) -> String {
    block.map(|b| format!(" in block {b}")).unwrap_or_default()
}

/// Result type for sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;
