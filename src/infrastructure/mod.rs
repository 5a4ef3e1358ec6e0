//! # Infrastructure Layer
//!
//! Adapters to the outside world: chain RPC, configuration sources,
//! notification sinks and log output.

pub mod blockchain;
pub mod config;
pub mod notifications;
pub mod telemetry;
