//! # Sweep Engine
//!
//! Runs one network's sweep from balance read to confirmed transfer.
//!
//! This module provides the [`SweepEngine`] which reads the deposit
//! account's balance, decides whether a transfer pays for itself, and, if
//! it does, forwards the residual to the vault under the retry policy.
//!
//! # Flow
//!
//! ```text
//! balance ──▶ below minimum? ──yes──▶ Skipped(InsufficientBalance)
//!                │ no
//!                ▼
//!           fee estimate ──▶ decide ──▶ Skipped(InsufficientForGas)
//!                                 │
//!                                 ▼
//!                   submit ──▶ await confirmation ──▶ Swept
//! ```

use crate::application::error::{SweepError, SweepResult};
use crate::application::services::retry::RetryPolicy;
use crate::domain::entities::{OutcomeKind, SkipReason, SweepReceipt, TxStatus};
use crate::domain::services::{SweepDecision, decide, meets_minimum};
use crate::domain::value_objects::{FeeBuffer, FeeEstimate, Wei};
use crate::infrastructure::blockchain::ChainClient;
use tracing::{debug, info};

/// Settings shared by every network's sweep.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    /// Destination of every transfer.
    pub vault_address: String,
    /// Balances below this are left alone.
    pub min_transfer: Wei,
    /// Proportional buffer applied to the fee unit price.
    pub fee_buffer: FeeBuffer,
    /// Compute transfers without submitting them.
    pub dry_run: bool,
    /// Retry policy for every chain call.
    pub retry: RetryPolicy,
}

impl SweepSettings {
    /// Creates settings with the default minimum, no buffer and the default
    /// retry policy.
    #[must_use]
    pub fn new(vault_address: impl Into<String>) -> Self {
        Self {
            vault_address: vault_address.into(),
            min_transfer: Wei::new(1_000_000_000_000_000),
            fee_buffer: FeeBuffer::NONE,
            dry_run: false,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the minimum transfer amount.
    #[must_use]
    pub fn with_min_transfer(mut self, min_transfer: Wei) -> Self {
        self.min_transfer = min_transfer;
        self
    }

    /// Sets the fee buffer.
    #[must_use]
    pub fn with_fee_buffer(mut self, fee_buffer: FeeBuffer) -> Self {
        self.fee_buffer = fee_buffer;
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Sweeps a single network.
#[derive(Debug, Clone)]
pub struct SweepEngine {
    settings: SweepSettings,
}

impl SweepEngine {
    /// Creates an engine.
    #[must_use]
    pub fn new(settings: SweepSettings) -> Self {
        Self { settings }
    }

    /// Reads the deposit balance and sweeps it if worthwhile.
    ///
    /// Returns `Skipped` or `Swept`; every other ending is an error.
    ///
    /// # Errors
    ///
    /// Returns `SweepError` if a chain call fails for good, the fee
    /// arithmetic overflows, or the transfer reverts.
    pub async fn sweep(&self, client: &dyn ChainClient) -> SweepResult<OutcomeKind> {
        let network = client.network();
        let deposit = client.deposit_address();
        let retry = self.settings.retry;

        let balance = retry
            .run("get balance", || client.get_balance(&deposit))
            .await?
            .value;
        info!(
            network = %network,
            address = %deposit,
            "balance: {} {}",
            balance.to_ether_string(),
            network.native_symbol()
        );

        if !meets_minimum(balance, self.settings.min_transfer) {
            let reason = SkipReason::InsufficientBalance {
                balance,
                minimum: self.settings.min_transfer,
            };
            debug!(network = %network, "skipped: {}", reason);
            return Ok(OutcomeKind::Skipped(reason));
        }

        let fee = retry
            .run("get fee estimate", || client.get_fee_estimate())
            .await?
            .value
            .with_buffer(self.settings.fee_buffer)?;
        debug!(network = %network, fee = %fee, "fee estimate");

        match decide(balance, fee, self.settings.min_transfer)? {
            SweepDecision::Transfer(amount) => {
                let receipt = self.execute(client, amount, fee).await?;
                Ok(OutcomeKind::Swept(receipt))
            }
            SweepDecision::InsufficientForGas => {
                let reason = SkipReason::InsufficientForGas {
                    balance,
                    max_gas_fee: fee.max_gas_fee()?,
                };
                info!(network = %network, "skipped: {}", reason);
                Ok(OutcomeKind::Skipped(reason))
            }
            SweepDecision::InsufficientBalance => Ok(OutcomeKind::Skipped(SkipReason::InsufficientBalance {
                balance,
                minimum: self.settings.min_transfer,
            })),
        }
    }

    /// Forwards `amount` to the vault and waits for one confirmation.
    ///
    /// In dry-run mode nothing is submitted.
    ///
    /// # Errors
    ///
    /// Returns `SweepError` if submission or confirmation fails, or the
    /// transfer reverts.
    pub async fn execute(
        &self,
        client: &dyn ChainClient,
        amount: Wei,
        fee: FeeEstimate,
    ) -> SweepResult<SweepReceipt> {
        let network = client.network();
        let vault = self.settings.vault_address.as_str();

        if self.settings.dry_run {
            info!(
                network = %network,
                vault = %vault,
                fee = %fee,
                "dry run: would sweep {} {}",
                amount.to_ether_string(),
                network.native_symbol()
            );
            return Ok(SweepReceipt::dry_run(network, amount));
        }

        let submitted = self
            .settings
            .retry
            .run("submit transfer", || client.submit(vault, amount, fee))
            .await?;
        let tx_hash = submitted.value;
        info!(
            network = %network,
            tx_hash = %tx_hash,
            attempts = submitted.attempts,
            "submitted transfer of {} {}",
            amount.to_ether_string(),
            network.native_symbol()
        );

        let record = self
            .settings
            .retry
            .run("await confirmation", || client.await_confirmation(&tx_hash))
            .await?
            .value;

        if record.status == TxStatus::Failed {
            return Err(SweepError::reverted(record.hash, record.confirmed_block));
        }

        info!(
            network = %network,
            tx_hash = %record.hash,
            block = ?record.confirmed_block,
            "swept {} {} to vault",
            amount.to_ether_string(),
            network.native_symbol()
        );

        Ok(SweepReceipt {
            network,
            amount_swept: amount,
            transaction_hash: Some(record.hash),
            confirmed_block: record.confirmed_block,
            dry_run: false,
        })
    }
}
