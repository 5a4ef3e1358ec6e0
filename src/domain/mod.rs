//! # Domain Layer
//!
//! Value objects, entities and pure services of the sweeper. Nothing in
//! this layer performs I/O.

pub mod entities;
pub mod services;
pub mod value_objects;
