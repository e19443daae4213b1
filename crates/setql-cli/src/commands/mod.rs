//! CLI command implementations.

pub mod catalog;
pub mod eval;
pub mod resolve;
