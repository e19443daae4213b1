//! # setql-common
//!
//! Foundation layer for Setql: types, values, and the error taxonomy.
//!
//! This crate provides the building blocks used by all other Setql crates.
//! It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (LogicalType, Value, Cardinality, SetMode, Volatility)
//! - [`utils`] - Utility functions and helpers (errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{Cardinality, LogicalType, SetMode, Value, Volatility};
pub use utils::error::{Error, Result};
