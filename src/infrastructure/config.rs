//! # Configuration
//!
//! Loads and validates the sweeper's configuration once at startup.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. An optional config file (TOML, JSON or YAML by extension) whose keys
//!    are the lowercase forms of the environment keys below.
//! 2. Process environment (after `.env` has been loaded by the binary).
//!
//! | Key | Default |
//! |-----|---------|
//! | `<NETWORK>_RPC_URL`, `<NETWORK>_CHAIN_ID` | none; network is unconfigured |
//! | `DEPOSIT_WALLET_PRIVATE_KEY` | required |
//! | `VAULT_WALLET_ADDRESS` | required |
//! | `MIN_TRANSFER_AMOUNT` | `0.001` |
//! | `MONITORING_INTERVAL` (ms) | `60000` |
//! | `SWEEP_NETWORKS` | `ethereum,bsc,arbitrum,base` |
//! | `DRY_RUN` | `false` |
//! | `RETRY_MAX_ATTEMPTS` | `3` |
//! | `RETRY_DELAY_MS` | `5000` |
//! | `FEE_BUFFER_PERCENT` | `0` |
//! | `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID` | unset |
//! | `EVENT_LOG_PATH` | unset |
//!
//! Every error here is fatal: the process must not start sweeping with a
//! configuration that failed validation.

use crate::application::services::retry::{DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use crate::application::services::sweep_engine::SweepSettings;
use crate::domain::services::{NetworkConfig, NetworkRegistry};
use crate::domain::value_objects::{FeeBuffer, Network, UnknownNetwork, Wei};
use crate::infrastructure::blockchain::{ChainClientFactory, EthereumClientFactory, parse_address};
use crate::infrastructure::notifications::StartupSummary;
use ethers::utils::to_checksum;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_MIN_TRANSFER: &str = "0.001";
const DEFAULT_INTERVAL_MS: u64 = 60_000;

/// Configuration error. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read.
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// A required key is absent.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A key is present but unusable.
    #[error("invalid {key}: {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The vault is the deposit account itself.
    #[error("vault address {0} is the deposit address")]
    VaultIsDeposit(String),

    /// `SWEEP_NETWORKS` names a network that does not exist.
    #[error("invalid SWEEP_NETWORKS: {0}")]
    UnknownNetwork(#[from] UnknownNetwork),

    /// Only one of the two Telegram credentials is set.
    #[error("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together")]
    IncompleteTelegram,
}

impl ConfigError {
    /// Creates an invalid setting error.
    #[must_use]
    pub fn invalid(key: &'static str, reason: impl fmt::Display) -> Self {
        Self::Invalid {
            key,
            reason: reason.to_string(),
        }
    }
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Scalar settings as they arrive from the sources, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    deposit_wallet_private_key: Option<String>,
    vault_wallet_address: Option<String>,
    min_transfer_amount: Option<String>,
    monitoring_interval: Option<String>,
    sweep_networks: Option<String>,
    dry_run: Option<String>,
    retry_max_attempts: Option<String>,
    retry_delay_ms: Option<String>,
    fee_buffer_percent: Option<String>,
    telegram_bot_token: Option<String>,
    telegram_chat_id: Option<String>,
    event_log_path: Option<String>,
}

/// Telegram delivery credentials.
#[derive(Clone)]
pub struct TelegramCredentials {
    /// Bot API token.
    pub bot_token: String,
    /// Destination chat.
    pub chat_id: String,
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Validated sweeper configuration.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Signer for the deposit account.
    pub deposit: EthereumClientFactory,
    /// Checksummed deposit address.
    pub deposit_address: String,
    /// Checksummed vault address.
    pub vault_address: String,
    /// Per-network endpoints.
    pub registry: NetworkRegistry,
    /// Networks to sweep, in order.
    pub networks: Vec<Network>,
    /// Minimum balance worth sweeping.
    pub min_transfer: Wei,
    /// Time between cycles.
    pub interval: Duration,
    /// Compute transfers without submitting them.
    pub dry_run: bool,
    /// Retry policy for chain calls.
    pub retry: RetryPolicy,
    /// Buffer applied to the fee unit price.
    pub fee_buffer: FeeBuffer,
    /// Telegram credentials, if notifications are enabled.
    pub telegram: Option<TelegramCredentials>,
    /// Event log file, if enabled.
    pub event_log_path: Option<PathBuf>,
}

impl SweeperConfig {
    /// Loads configuration from an optional file and the process environment.
    ///
    /// A file that was asked for must exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or validation fails.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::build(path, None)
    }

    /// Loads configuration from an optional file and an explicit key/value
    /// map instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`SweeperConfig::load`].
    pub fn from_env_map(path: Option<&Path>, env: config::Map<String, String>) -> ConfigResult<Self> {
        Self::build(path, Some(env))
    }

    fn build(path: Option<&Path>, env: Option<config::Map<String, String>>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::default().source(env))
            .build()?;

        let raw: RawSettings = settings.clone().try_deserialize()?;
        Self::validate(raw, &settings)
    }

    fn validate(raw: RawSettings, settings: &config::Config) -> ConfigResult<Self> {
        let key = non_empty(raw.deposit_wallet_private_key)
            .ok_or(ConfigError::Missing("DEPOSIT_WALLET_PRIVATE_KEY"))?;
        let deposit = EthereumClientFactory::from_private_key(&key)
            .map_err(|e| ConfigError::invalid("DEPOSIT_WALLET_PRIVATE_KEY", e))?;
        let deposit_address = deposit.deposit_address();

        let vault = non_empty(raw.vault_wallet_address).ok_or(ConfigError::Missing("VAULT_WALLET_ADDRESS"))?;
        let vault = parse_address(&vault).map_err(|e| ConfigError::invalid("VAULT_WALLET_ADDRESS", e))?;
        let vault_address = to_checksum(&vault, None);
        if vault_address == deposit_address {
            return Err(ConfigError::VaultIsDeposit(vault_address));
        }

        let min_transfer = Wei::from_ether_str(
            non_empty(raw.min_transfer_amount)
                .as_deref()
                .unwrap_or(DEFAULT_MIN_TRANSFER),
        )
        .map_err(|e| ConfigError::invalid("MIN_TRANSFER_AMOUNT", e))?;

        let interval_ms = parse_or("MONITORING_INTERVAL", raw.monitoring_interval, DEFAULT_INTERVAL_MS)?;
        if interval_ms == 0 {
            return Err(ConfigError::invalid("MONITORING_INTERVAL", "must be greater than zero"));
        }

        let networks = match non_empty(raw.sweep_networks) {
            Some(list) => parse_network_list(&list)?,
            None => Network::DEFAULT_SET.to_vec(),
        };

        let dry_run = match non_empty(raw.dry_run) {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::invalid("DRY_RUN", value))?,
            None => false,
        };

        let max_attempts = parse_or("RETRY_MAX_ATTEMPTS", raw.retry_max_attempts, DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::invalid("RETRY_MAX_ATTEMPTS", "must be at least 1"));
        }
        let delay_ms = parse_or(
            "RETRY_DELAY_MS",
            raw.retry_delay_ms,
            u64::try_from(DEFAULT_DELAY.as_millis()).unwrap_or(u64::MAX),
        )?;

        let fee_buffer = FeeBuffer::new(parse_or("FEE_BUFFER_PERCENT", raw.fee_buffer_percent, 0u32)?);

        let telegram = match (non_empty(raw.telegram_bot_token), non_empty(raw.telegram_chat_id)) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramCredentials { bot_token, chat_id }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTelegram),
        };

        Ok(Self {
            deposit,
            deposit_address,
            vault_address,
            registry: load_registry(settings)?,
            networks,
            min_transfer,
            interval: Duration::from_millis(interval_ms),
            dry_run,
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(delay_ms)),
            fee_buffer,
            telegram,
            event_log_path: non_empty(raw.event_log_path).map(PathBuf::from),
        })
    }

    /// Settings for the per-network sweep.
    #[must_use]
    pub fn sweep_settings(&self) -> SweepSettings {
        SweepSettings::new(self.vault_address.clone())
            .with_min_transfer(self.min_transfer)
            .with_fee_buffer(self.fee_buffer)
            .with_dry_run(self.dry_run)
            .with_retry(self.retry)
    }

    /// What to announce at startup.
    #[must_use]
    pub fn startup_summary(&self) -> StartupSummary {
        StartupSummary {
            deposit_address: self.deposit_address.clone(),
            vault_address: self.vault_address.clone(),
            networks: self.networks.clone(),
            min_transfer: self.min_transfer,
            interval_ms: u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            dry_run: self.dry_run,
        }
    }
}

/// Reads `<network>_rpc_url` / `<network>_chain_id` for every known network.
///
/// A network with neither key is left out. A network with only one of them,
/// or an unparsable chain id, is kept with an empty endpoint or a zero chain
/// id so lookups report it as unconfigured.
fn load_registry(settings: &config::Config) -> ConfigResult<NetworkRegistry> {
    let mut entries = Vec::new();
    for network in Network::ALL {
        let prefix = network.env_prefix().to_ascii_lowercase();
        let endpoint = get_optional(settings, &format!("{prefix}_rpc_url"))?;
        let chain_id = get_optional(settings, &format!("{prefix}_chain_id"))?;
        if endpoint.is_none() && chain_id.is_none() {
            continue;
        }

        let chain_id = match chain_id {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                warn!(network = %network, "ignoring unparsable chain id {:?}", raw);
                0
            }),
            None => 0,
        };
        entries.push(NetworkConfig::new(network, endpoint.unwrap_or_default(), chain_id));
    }
    Ok(NetworkRegistry::new(entries))
}

fn get_optional(settings: &config::Config, key: &str) -> ConfigResult<Option<String>> {
    match settings.get_string(key) {
        Ok(value) => Ok(non_empty(Some(value))),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match non_empty(value) {
        Some(v) => v.parse().map_err(|e| ConfigError::invalid(key, format!("{v:?}: {e}"))),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_network_list(list: &str) -> ConfigResult<Vec<Network>> {
    let mut networks = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let network: Network = name.parse()?;
        if !networks.contains(&network) {
            networks.push(network);
        }
    }
    if networks.is_empty() {
        return Err(ConfigError::invalid("SWEEP_NETWORKS", "no networks listed"));
    }
    Ok(networks)
}
