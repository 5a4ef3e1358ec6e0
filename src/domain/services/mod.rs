//! # Domain Services
//!
//! Pure logic with no I/O.
//!
//! ## Services
//!
//! - [`network_registry::NetworkRegistry`]: Network name to connection parameters
//! - [`sweep_decision::decide`]: Skip-or-transfer decision for one balance

pub mod network_registry;
pub mod sweep_decision;

pub use network_registry::{NetworkConfig, NetworkRegistry, Unconfigured};
pub use sweep_decision::{SweepDecision, decide, meets_minimum};
