//! Core type definitions for Setql.
//!
//! This module contains the fundamental types shared by the resolver, the
//! emitter and the execution layer:
//! - Type system ([`LogicalType`])
//! - Runtime elements ([`Value`])
//! - Set shapes ([`Cardinality`], [`SetMode`])
//! - Optimizability ([`Volatility`])

mod cardinality;
mod logical_type;
mod value;
mod volatility;

pub use cardinality::{Cardinality, SetMode};
pub use logical_type::LogicalType;
pub use value::Value;
pub use volatility::Volatility;
