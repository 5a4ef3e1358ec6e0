//! # Domain Entities
//!
//! Records produced while sweeping a network.
//!
//! ## Entities
//!
//! - [`TransactionRecord`]: Submitted transfer and its confirmation state
//! - [`NetworkOutcome`]: What happened on one network in a cycle
//! - [`SweepCycleResult`]: Ordered outcomes of one scheduler tick

pub mod outcome;
pub mod transaction;

pub use outcome::{NetworkOutcome, OutcomeKind, SkipReason, SweepCycleResult, SweepReceipt};
pub use transaction::{TransactionRecord, TxHash, TxStatus};
