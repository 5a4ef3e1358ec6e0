//! # Application Layer
//!
//! Use cases built on the domain: sweeping one network and scheduling
//! cycles across all of them.

pub mod error;
pub mod services;

pub use error::{SweepError, SweepResult};
