//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Numeric Types
//!
//! - [`Wei`]: Native-asset amount with checked arithmetic
//! - [`FeeEstimate`]: Unit price and gas limit of a transfer
//! - [`FeeBuffer`]: Integer percentage price buffer
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe arithmetic operations
//!
//! ## Domain Enums
//!
//! - [`Network`]: Supported networks

pub mod arithmetic;
pub mod fee;
pub mod network;
pub mod wei;

pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic, mul_div};
pub use fee::{FeeBuffer, FeeEstimate, PLAIN_TRANSFER_GAS};
pub use network::{Network, UnknownNetwork};
pub use wei::Wei;
