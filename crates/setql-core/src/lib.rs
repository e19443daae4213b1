//! # setql-core
//!
//! Core layer for Setql: the executable fragment representation, the
//! fragment-builder interface that lowering targets, and a reference
//! in-memory executor with the set kernels.
//!
//! This crate depends only on `setql-common`.
//!
//! ## Modules
//!
//! - [`execution`] - Fragments, builders, data sources, functions, executor

pub mod execution;

// Re-export commonly used types
pub use execution::{
    DataSource, EmptySource, Evaluation, Executor, Fragment, FragmentBuilder, FunctionRegistry,
    InMemorySource, InputSpec, PlanBuilder,
};
