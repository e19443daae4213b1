//! Bottom-up annotation of expression trees.
//!
//! The binder visits every node once, children first. Constants and inputs
//! are annotated from their declarations; calls are resolved against the
//! catalog, then their cardinality, volatility and row estimate are derived
//! from the already annotated arguments.

use super::expr::{ExprKind, ExprNode, NodeInfo};
use super::modes::propagate_cardinality;
use super::optimizer::CardinalityEstimator;
use super::resolver::resolve;
use super::volatility::combine_all;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::session::CancellationToken;
use setql_common::types::{Cardinality, LogicalType, Volatility};
use setql_common::utils::error::{Error, ResolveError, Result};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Annotates expression trees.
pub struct Binder<'a> {
    catalog: &'a Catalog,
    estimator: &'a CardinalityEstimator,
    max_depth: usize,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> Binder<'a> {
    /// Creates a binder over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog, estimator: &'a CardinalityEstimator) -> Self {
        Self {
            catalog,
            estimator,
            max_depth: Config::default().max_depth,
            cancel: None,
        }
    }

    /// Sets the maximum tree depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Checks `token` between node visits.
    #[must_use]
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Annotates every node of `root`.
    ///
    /// # Errors
    ///
    /// Fails if the tree is too deep, a node is already bound, a set literal
    /// is malformed, a call cannot be resolved or the token is cancelled.
    pub fn bind(&self, root: &mut ExprNode) -> Result<()> {
        let depth = root.depth();
        if depth > self.max_depth {
            return Err(ResolveError::DepthExceeded {
                limit: self.max_depth,
            }
            .into());
        }
        debug!(depth, "binding expression");
        self.bind_node(root)
    }

    fn bind_node(&self, node: &mut ExprNode) -> Result<()> {
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }
        if node.is_resolved() {
            return Err(ResolveError::AlreadyResolved.into());
        }
        for child in node.args_mut() {
            self.bind_node(child)?;
        }

        let info = match node.kind() {
            ExprKind::Literal(value) => NodeInfo {
                ty: value.logical_type(),
                cardinality: Cardinality::One,
                volatility: Volatility::Immutable,
                estimated_rows: 1.0,
                call: None,
            },
            ExprKind::Set {
                element_type,
                values,
            } => {
                if let Some(bad) = values.iter().find(|v| v.logical_type() != *element_type) {
                    return Err(ResolveError::InvalidLiteral(format!(
                        "element {bad} is not of type {element_type}"
                    ))
                    .into());
                }
                NodeInfo {
                    ty: *element_type,
                    cardinality: Cardinality::of_len(values.len()),
                    volatility: Volatility::Immutable,
                    estimated_rows: values.len() as f64,
                    call: None,
                }
            }
            ExprKind::Input(input) => NodeInfo {
                ty: input.ty,
                cardinality: input.cardinality,
                volatility: input.volatility,
                estimated_rows: self.estimator.estimate_input(input),
                call: None,
            },
            ExprKind::Call { name, args } => {
                let mut arg_types: SmallVec<[LogicalType; 4]> = SmallVec::new();
                let mut arg_cards: SmallVec<[Cardinality; 4]> = SmallVec::new();
                let mut arg_volatility: SmallVec<[Volatility; 4]> = SmallVec::new();
                let mut arg_rows: SmallVec<[f64; 4]> = SmallVec::new();
                for arg in args {
                    let info = arg.try_info()?;
                    arg_types.push(info.ty);
                    arg_cards.push(info.cardinality);
                    arg_volatility.push(info.volatility);
                    arg_rows.push(info.estimated_rows);
                }

                let resolved = resolve(self.catalog, name, &arg_types)?;
                let signature = &resolved.signature;
                let cardinality = propagate_cardinality(signature, &arg_cards);
                let volatility = combine_all(signature.volatility, arg_volatility);
                let estimated_rows =
                    self.estimator
                        .estimate_call(signature, args, &arg_rows, cardinality);
                trace!(
                    operator = %signature.specialized_name(),
                    %cardinality,
                    %volatility,
                    "bound call"
                );
                NodeInfo {
                    ty: resolved.return_type,
                    cardinality,
                    volatility,
                    estimated_rows,
                    call: Some(resolved),
                }
            }
        };
        node.annotate(info)?;
        Ok(())
    }
}
