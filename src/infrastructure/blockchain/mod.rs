//! # Blockchain Clients
//!
//! Clients for balance queries and transfers on EVM networks.
//!
//! ## Available Components
//!
//! - [`ChainClient`]: Trait for the chain operations the sweeper needs
//! - [`ChainClientFactory`]: Builds a client per configured network
//! - [`EthereumClient`]: ethers-rs implementation
//! - [`FeeData`]: Node fee data and unit price selection

pub mod client;
pub mod ethereum;
pub mod gas;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{ChainClient, ChainClientFactory, ChainError, ChainResult};
pub use ethereum::{EthereumClient, EthereumClientFactory, parse_address};
pub use gas::FeeData;
