//! Execution primitives.
//!
//! - [`Fragment`]: the reference executable fragment tree
//! - [`FragmentBuilder`]: the interface lowering targets implement
//! - [`PlanBuilder`]: builds [`Fragment`]s
//! - [`DataSource`]: where input sets come from
//! - [`FunctionRegistry`]: implementations of engine-bound functions
//! - [`Executor`]: evaluates fragments in memory
//!
//! The `operators` submodule holds the set kernels the executor applies.

mod builder;
mod executor;
mod fragment;
mod functions;
pub mod operators;
mod source;

pub use builder::{FragmentBuilder, PlanBuilder};
pub use executor::Executor;
pub use fragment::{Evaluation, Fragment, InputSpec};
pub use functions::{FunctionImpl, FunctionRegistry};
pub use source::{DataSource, EmptySource, InMemorySource};
