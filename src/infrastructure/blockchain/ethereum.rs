//! # Ethereum Client
//!
//! EVM client implementation using ethers-rs.
//!
//! Provides balance, fee and transfer operations for Ethereum mainnet and
//! the EVM networks in [`Network`], signing with the deposit account's
//! local key.

use super::client::{ChainClient, ChainClientFactory, ChainError, ChainResult};
use super::gas::FeeData;
use crate::domain::entities::{TransactionRecord, TxHash};
use crate::domain::services::NetworkConfig;
use crate::domain::value_objects::{FeeEstimate, Network, Wei};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::middleware::signer::SignerMiddlewareError;
use ethers::providers::{Http, Middleware, Provider, ProviderError, RpcError};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, TransactionReceipt, TransactionRequest, U256};
use ethers::utils::to_checksum;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Lower bound on receipt polling, so fast chains don't hammer the endpoint.
const MIN_POLL_INTERVAL_MS: u64 = 1000;

/// How long one confirmation wait polls before giving up with a timeout.
const RECEIPT_TIMEOUT_SECS: u64 = 180;

type SignerClient = SignerMiddleware<Arc<Provider<Http>>, LocalWallet>;

/// Ethereum client implementation using ethers-rs.
#[derive(Debug)]
pub struct EthereumClient {
    /// The network this client is connected to.
    network: Network,
    /// Read-only RPC provider.
    provider: Arc<Provider<Http>>,
    /// Provider wrapped with the deposit account signer.
    signer: SignerClient,
    /// Delay between receipt polls.
    poll_interval: Duration,
    /// Upper bound on one confirmation wait.
    receipt_timeout: Duration,
}

impl EthereumClient {
    /// Creates a new Ethereum client.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint and chain id of the network
    /// * `wallet` - Deposit account signer
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be parsed.
    pub fn new(config: &NetworkConfig, wallet: LocalWallet) -> ChainResult<Self> {
        let poll_interval = config.network.block_time_ms().max(MIN_POLL_INTERVAL_MS);
        let provider = Provider::<Http>::try_from(config.endpoint.as_str())
            .map_err(|e| ChainError::connection(format!("invalid endpoint: {e}")))?;
        let provider = Arc::new(provider);

        let wallet = wallet.with_chain_id(config.chain_id);
        let signer = SignerMiddleware::new(provider.clone(), wallet);

        Ok(Self {
            network: config.network,
            provider,
            signer,
            poll_interval: Duration::from_millis(poll_interval),
            receipt_timeout: Duration::from_secs(RECEIPT_TIMEOUT_SECS),
        })
    }

    /// Polls until the node returns a mined receipt for `hash`.
    ///
    /// A missing receipt is not final: right after broadcast, a
    /// load-balanced endpoint may route the lookup to a node that has not
    /// seen the transaction yet.
    async fn poll_receipt(&self, hash: H256) -> ChainResult<TransactionReceipt> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .map_err(classify_provider_error)?;
            if let Some(receipt) = receipt.filter(|r| r.block_number.is_some()) {
                return Ok(receipt);
            }
            debug!(network = %self.network, tx_hash = ?hash, "receipt not available yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Fetches legacy and EIP-1559 fee data from the node.
    async fn fee_data(&self) -> ChainResult<FeeData> {
        let mut data = FeeData::default();

        match self.provider.get_gas_price().await {
            Ok(price) => data.gas_price = Some(to_u128(price, "gas price")?),
            Err(e) => {
                let err = classify_provider_error(e);
                if err.is_retryable() {
                    return Err(err);
                }
                debug!(network = %self.network, "legacy gas price unavailable: {}", err);
            }
        }

        if data.unit_price().is_none() {
            let (max_fee, priority_fee) = self
                .provider
                .estimate_eip1559_fees(None)
                .await
                .map_err(classify_provider_error)?;
            data.max_fee_per_gas = Some(to_u128(max_fee, "max fee per gas")?);
            data.max_priority_fee_per_gas = Some(to_u128(priority_fee, "priority fee")?);
        }

        Ok(data)
    }
}

#[async_trait]
impl ChainClient for EthereumClient {
    fn network(&self) -> Network {
        self.network
    }

    fn deposit_address(&self) -> String {
        to_checksum(&self.signer.address(), None)
    }

    async fn get_balance(&self, address: &str) -> ChainResult<Wei> {
        let addr = parse_address(address)?;

        let balance = self
            .provider
            .get_balance(addr, None)
            .await
            .map_err(classify_provider_error)?;

        Wei::try_from(balance).map_err(|e| ChainError::internal(format!("balance {balance}: {e}")))
    }

    async fn get_fee_estimate(&self) -> ChainResult<FeeEstimate> {
        let data = self.fee_data().await?;
        debug!(network = %self.network, fees = %data, "fee data");
        data.to_estimate()
    }

    async fn submit(&self, destination: &str, amount: Wei, fee: FeeEstimate) -> ChainResult<TxHash> {
        let to_addr = parse_address(destination)?;

        let tx = TransactionRequest::new()
            .to(to_addr)
            .value(U256::from(amount))
            .gas(fee.gas_limit)
            .gas_price(U256::from(fee.unit_price));

        let pending = self
            .signer
            .send_transaction(tx, None)
            .await
            .map_err(classify_signer_error)?;

        Ok(TxHash::new(format!("{:?}", pending.tx_hash())))
    }

    async fn await_confirmation(&self, tx_hash: &TxHash) -> ChainResult<TransactionRecord> {
        let hash: H256 = tx_hash
            .as_str()
            .parse()
            .map_err(|_| ChainError::internal(format!("invalid transaction hash: {tx_hash}")))?;

        let receipt = tokio::time::timeout(self.receipt_timeout, self.poll_receipt(hash))
            .await
            .map_err(|_| {
                ChainError::timeout(format!(
                    "no receipt for {tx_hash} after {}s",
                    self.receipt_timeout.as_secs()
                ))
            })??;

        Ok(receipt_record(tx_hash, &receipt))
    }
}

/// Builds [`EthereumClient`]s that share one deposit account signer.
#[derive(Debug, Clone)]
pub struct EthereumClientFactory {
    wallet: LocalWallet,
}

impl EthereumClientFactory {
    /// Creates a factory from a hex-encoded private key (with or without `0x`).
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Signing` if the key is malformed.
    pub fn from_private_key(private_key: &str) -> ChainResult<Self> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| ChainError::signing(format!("invalid deposit private key: {e}")))?;
        Ok(Self { wallet })
    }
}

impl ChainClientFactory for EthereumClientFactory {
    fn deposit_address(&self) -> String {
        to_checksum(&self.wallet.address(), None)
    }

    fn connect(&self, config: &NetworkConfig) -> ChainResult<Arc<dyn ChainClient>> {
        let client = EthereumClient::new(config, self.wallet.clone())?;
        Ok(Arc::new(client))
    }
}

/// Parses a hex address.
///
/// # Errors
///
/// Returns `ChainError::InvalidAddress` if `address` is not a 20-byte hex string.
pub fn parse_address(address: &str) -> ChainResult<Address> {
    address
        .trim()
        .parse()
        .map_err(|_| ChainError::invalid_address(address.to_string()))
}

fn receipt_record(tx_hash: &TxHash, receipt: &TransactionReceipt) -> TransactionRecord {
    let block = receipt.block_number.map(|n| n.as_u64());
    let succeeded = receipt.status.is_some_and(|s| s.as_u64() == 1);

    match (succeeded, block) {
        (true, Some(block)) => TransactionRecord::confirmed(tx_hash.clone(), block),
        (true, None) => TransactionRecord::pending(tx_hash.clone()),
        (false, block) => TransactionRecord::reverted(tx_hash.clone(), block),
    }
}

fn to_u128(value: U256, what: &str) -> ChainResult<u128> {
    Wei::try_from(value)
        .map(|w| w.get())
        .map_err(|_| ChainError::internal(format!("{what} out of range: {value}")))
}

/// Node error responses are fatal; transport failures are transient.
fn classify_provider_error(err: ProviderError) -> ChainError {
    if let Some(response) = err.as_error_response() {
        return ChainError::rejected(format!("{} (code {})", response.message, response.code));
    }

    match err {
        ProviderError::SerdeJson(e) => ChainError::internal(e.to_string()),
        ProviderError::HexError(e) => ChainError::internal(e.to_string()),
        other => {
            let message = other.to_string();
            if message.contains("timed out") || message.contains("timeout") {
                ChainError::timeout(message)
            } else {
                ChainError::connection(message)
            }
        }
    }
}

fn classify_signer_error(err: SignerMiddlewareError<Arc<Provider<Http>>, LocalWallet>) -> ChainError {
    match err {
        SignerMiddlewareError::MiddlewareError(inner) => classify_provider_error(inner),
        SignerMiddlewareError::SignerError(inner) => ChainError::signing(inner.to_string()),
        other => ChainError::rejected(other.to_string()),
    }
}
