//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`RetryPolicy`]: Bounded retry for chain calls
//! - [`SweepEngine`]: One network's balance check and transfer
//! - [`SweepScheduler`]: Interval-driven, overlap-guarded fan-out

pub mod retry;
pub mod scheduler;
pub mod sweep_engine;

pub use retry::{RetryError, RetryPolicy, Retryable, Retried};
pub use scheduler::{SchedulerState, SweepScheduler};
pub use sweep_engine::{SweepEngine, SweepSettings};
