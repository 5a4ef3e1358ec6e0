//! # Transactions
//!
//! Handle and record of a submitted sweep transfer. A record only lives for
//! the duration of one submit-then-confirm sequence; nothing is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction hash as returned by the node (0x-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    /// Creates a new transaction hash.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Broadcast, not yet mined.
    Pending,
    /// Mined with a success status.
    Confirmed,
    /// Mined but reverted.
    Failed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of waiting on a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash.
    pub hash: TxHash,
    /// Block the transaction was included in, once mined.
    pub confirmed_block: Option<u64>,
    /// Current status.
    pub status: TxStatus,
}

impl TransactionRecord {
    /// Creates a pending record for a freshly broadcast transaction.
    #[must_use]
    pub fn pending(hash: TxHash) -> Self {
        Self {
            hash,
            confirmed_block: None,
            status: TxStatus::Pending,
        }
    }

    /// Creates a confirmed record.
    #[must_use]
    pub fn confirmed(hash: TxHash, block: u64) -> Self {
        Self {
            hash,
            confirmed_block: Some(block),
            status: TxStatus::Confirmed,
        }
    }

    /// Creates a record for a transaction that was mined but reverted.
    #[must_use]
    pub fn reverted(hash: TxHash, block: Option<u64>) -> Self {
        Self {
            hash,
            confirmed_block: block,
            status: TxStatus::Failed,
        }
    }
}
