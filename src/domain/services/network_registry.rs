//! # Network Registry
//!
//! Static lookup from a [`Network`] to its connection parameters.
//!
//! The registry is built once at startup and never mutated. An entry whose
//! endpoint is empty or whose chain id is zero is kept, but looking it up
//! yields [`Unconfigured`] so the caller skips that network.

use crate::domain::value_objects::Network;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Connection parameters of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The network.
    pub network: Network,
    /// JSON-RPC endpoint URL.
    pub endpoint: String,
    /// EIP-155 chain id.
    pub chain_id: u64,
}

impl NetworkConfig {
    /// Creates a network configuration.
    #[must_use]
    pub fn new(network: Network, endpoint: impl Into<String>, chain_id: u64) -> Self {
        Self {
            network,
            endpoint: endpoint.into(),
            chain_id,
        }
    }

    /// Checks the entry is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Unconfigured`] if the endpoint is blank or the chain id is zero.
    pub fn validate(&self) -> Result<(), Unconfigured> {
        if self.endpoint.trim().is_empty() {
            return Err(Unconfigured::MissingEndpoint(self.network));
        }
        if self.chain_id == 0 {
            return Err(Unconfigured::InvalidChainId(self.network));
        }
        Ok(())
    }
}

/// Why a network cannot be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unconfigured {
    /// No entry at all.
    #[error("no configuration for network {0}")]
    Missing(Network),

    /// Entry present, endpoint blank.
    #[error("missing RPC endpoint for network {0}")]
    MissingEndpoint(Network),

    /// Entry present, chain id missing or zero.
    #[error("invalid chain id for network {0}")]
    InvalidChainId(Network),
}

/// Immutable network lookup table.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    entries: BTreeMap<Network, NetworkConfig>,
}

impl NetworkRegistry {
    /// Builds a registry. A later entry for the same network replaces an earlier one.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = NetworkConfig>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|config| (config.network, config))
                .collect(),
        }
    }

    /// Looks up a network.
    ///
    /// # Errors
    ///
    /// Returns [`Unconfigured`] if the network is unknown to the registry or
    /// its entry is incomplete.
    pub fn lookup(&self, network: Network) -> Result<&NetworkConfig, Unconfigured> {
        let config = self
            .entries
            .get(&network)
            .ok_or(Unconfigured::Missing(network))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the networks that resolve to a usable configuration.
    #[must_use]
    pub fn configured(&self) -> Vec<Network> {
        self.entries
            .values()
            .filter(|config| config.validate().is_ok())
            .map(|config| config.network)
            .collect()
    }
}
