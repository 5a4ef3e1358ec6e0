//! # Vault Sweeper
//!
//! Unattended agent that moves the native balance of a deposit account to
//! a vault address on every configured EVM network.
//!
//! Every interval the scheduler fans a cycle out across the networks. For
//! each one the engine reads the deposit balance, skips dust and balances
//! that would not cover their own gas, and otherwise transfers
//! `balance - unit_price * gas_limit` to the vault, retrying transient
//! failures a bounded number of times.
//!
//! ## Architecture
//!
//! - [`domain`]: amounts, networks, fee estimates and the pure sweep decision
//! - [`application`]: retry policy, per-network engine and scheduler
//! - [`infrastructure`]: ethers-rs client, configuration, notifications, logging

pub mod application;
pub mod domain;
pub mod infrastructure;
