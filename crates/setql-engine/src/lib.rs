//! # setql-engine
//!
//! The main entry point for Setql: the operator catalog, overload
//! resolution, set-mode propagation, volatility tracking and lowering of
//! expression trees into executable fragments.
//!
//! ## Modules
//!
//! - [`engine`] - Engine struct holding the frozen catalog
//! - [`session`] - Per-query sessions and cancellation
//! - [`config`] - Configuration options
//! - [`catalog`] - Operator declarations and the overload table
//! - [`query`] - Binding, resolution, propagation and emission

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod query;
pub mod session;

pub use catalog::{Catalog, CatalogBuilder, OperatorSignature};
pub use config::Config;
pub use engine::Engine;
pub use query::{ExprNode, InputRef};
pub use session::{CancellationToken, Session};
