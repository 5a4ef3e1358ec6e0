//! # Networks
//!
//! The closed set of networks the sweeper knows how to reach.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported blockchain networks.
///
/// Every network the sweeper can touch is a variant here, so a lookup can
/// never land on an undefined entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ethereum mainnet.
    Ethereum,
    /// BNB Smart Chain.
    Bsc,
    /// Arbitrum One.
    Arbitrum,
    /// Base mainnet.
    Base,
    /// Polygon PoS.
    Polygon,
    /// Optimism mainnet.
    Optimism,
}

impl Network {
    /// Every supported network, in sweep order.
    pub const ALL: [Self; 6] = [
        Self::Ethereum,
        Self::Bsc,
        Self::Arbitrum,
        Self::Base,
        Self::Polygon,
        Self::Optimism,
    ];

    /// Networks swept when no explicit selection is configured.
    pub const DEFAULT_SET: [Self; 4] = [Self::Ethereum, Self::Bsc, Self::Arbitrum, Self::Base];

    /// Returns the network name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Bsc => "bsc",
            Self::Arbitrum => "arbitrum",
            Self::Base => "base",
            Self::Polygon => "polygon",
            Self::Optimism => "optimism",
        }
    }

    /// Returns the ticker of the native asset.
    #[must_use]
    pub const fn native_symbol(&self) -> &'static str {
        match self {
            Self::Bsc => "BNB",
            Self::Polygon => "POL",
            Self::Ethereum | Self::Arbitrum | Self::Base | Self::Optimism => "ETH",
        }
    }

    /// Returns the average block time in milliseconds.
    #[must_use]
    pub const fn block_time_ms(&self) -> u64 {
        match self {
            Self::Ethereum => 12000,
            Self::Bsc => 3000,
            Self::Arbitrum => 250,
            Self::Base | Self::Polygon | Self::Optimism => 2000,
        }
    }

    /// Returns the prefix used for this network's environment keys,
    /// e.g. `ETHEREUM` for `ETHEREUM_RPC_URL`.
    #[must_use]
    pub const fn env_prefix(&self) -> &'static str {
        match self {
            Self::Ethereum => "ETHEREUM",
            Self::Bsc => "BSC",
            Self::Arbitrum => "ARBITRUM",
            Self::Base => "BASE",
            Self::Polygon => "POLYGON",
            Self::Optimism => "OPTIMISM",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when parsing an unknown network name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|network| network.name() == wanted)
            .ok_or(UnknownNetwork(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Ethereum".parse::<Network>().unwrap(), Network::Ethereum);
        assert_eq!(" bsc ".parse::<Network>().unwrap(), Network::Bsc);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "solana".parse::<Network>().unwrap_err();
        assert_eq!(err.to_string(), "unknown network: solana");
    }

    #[test]
    fn names_round_trip() {
        for network in Network::ALL {
            assert_eq!(network.name().parse::<Network>().unwrap(), network);
        }
    }

    #[test]
    fn native_symbols() {
        assert_eq!(Network::Bsc.native_symbol(), "BNB");
        assert_eq!(Network::Base.native_symbol(), "ETH");
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&Network::Arbitrum).unwrap();
        assert_eq!(json, "\"arbitrum\"");
    }
}
