//! # Chain Client Trait
//!
//! Port definition for the chain operations the sweeper needs.
//!
//! This module defines the [`ChainClient`] trait that abstracts balance
//! queries, fee estimation, transfer submission and confirmation for one
//! network. Connection setup and JSON-RPC framing stay behind the trait.

use crate::domain::entities::{TransactionRecord, TxHash};
use crate::domain::services::NetworkConfig;
use crate::domain::value_objects::{FeeEstimate, Network, Wei};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error type for chain operations.
///
/// Split into transient failures, which the retry policy may try again, and
/// fatal failures, which are surfaced immediately.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// RPC connection or transport error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Timeout talking to the node or waiting for a receipt.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Malformed address passed to the client.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Node rejected the request (bad parameters, insufficient funds, nonce).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Signing the transaction failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Value returned by the node could not be represented.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates an invalid address error.
    #[must_use]
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    /// Creates a rejected request error.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Creates a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this error is transient and the call may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Chain operations for a single network.
///
/// Each implementation owns the deposit account's signing credential for
/// the process lifetime and never exposes it.
#[async_trait]
pub trait ChainClient: Send + Sync + fmt::Debug {
    /// Returns the network this client is connected to.
    fn network(&self) -> Network;

    /// Returns the deposit account address this client signs for.
    fn deposit_address(&self) -> String;

    /// Returns the native-asset balance of an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the RPC call fails.
    async fn get_balance(&self, address: &str) -> ChainResult<Wei>;

    /// Returns the fee parameters for a plain transfer.
    ///
    /// `unit_price` is the network gas price, or max fee per gas when the
    /// legacy price is unavailable. `gas_limit` is the plain-transfer constant.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or reports no price at all.
    async fn get_fee_estimate(&self) -> ChainResult<FeeEstimate>;

    /// Signs and broadcasts a transfer from the deposit account.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or broadcasting fails.
    async fn submit(&self, destination: &str, amount: Wei, fee: FeeEstimate) -> ChainResult<TxHash>;

    /// Suspends until the transaction has at least one confirmation.
    ///
    /// # Errors
    ///
    /// Returns a retryable error if no receipt appears in time, or if the
    /// node cannot be reached.
    async fn await_confirmation(&self, tx_hash: &TxHash) -> ChainResult<TransactionRecord>;
}

/// Builds a [`ChainClient`] for a configured network.
///
/// Connecting performs no I/O; the first RPC call happens on first use.
pub trait ChainClientFactory: Send + Sync + fmt::Debug {
    /// Returns the deposit account address shared by every client.
    fn deposit_address(&self) -> String;

    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be parsed.
    fn connect(&self, config: &NetworkConfig) -> ChainResult<Arc<dyn ChainClient>>;
}
