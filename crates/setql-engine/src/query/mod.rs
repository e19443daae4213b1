//! Expression processing pipeline.
//!
//! - **Expr**: expression trees and their annotations
//! - **Resolver**: overload resolution against the catalog
//! - **Modes**: set-mode and cardinality propagation
//! - **Volatility**: volatility classification
//! - **Binder**: bottom-up annotation of a tree
//! - **Emitter**: lowering into executable fragments
//! - **Optimizer**: row-count estimation

pub mod binder;
pub mod emitter;
pub mod expr;
pub mod modes;
pub mod optimizer;
pub mod resolver;
pub mod volatility;

pub use binder::Binder;
pub use emitter::Emitter;
pub use expr::{ExprKind, ExprNode, InputRef, NodeInfo};
pub use modes::{propagate, propagate_cardinality};
pub use optimizer::{CardinalityEstimator, InputStats};
pub use resolver::{Coercion, ResolvedSignature, resolve};
pub use volatility::classify;
