//! Planner support.
//!
//! ## Submodules
//!
//! - [`cardinality`] - Row-count estimation for expression nodes

pub mod cardinality;

pub use cardinality::{CardinalityEstimator, InputStats};
