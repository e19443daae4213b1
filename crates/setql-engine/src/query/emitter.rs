//! Lowering of bound expression trees into executable fragments.
//!
//! The emitter is generic over [`FragmentBuilder`], so the same lowering
//! drives any target. Coercions recorded during resolution become explicit
//! casts and omitted defaulted arguments become literals. Volatility
//! decides input reuse and constant folding. A `??` is eager only when its
//! fallback is a constant.

use super::expr::{ExprKind, ExprNode, NodeInfo};
use crate::catalog::OperatorImpl;
use crate::session::CancellationToken;
use setql_common::types::{LogicalType, SetMode, Value, Volatility};
use setql_common::utils::error::{Error, ResolveError, Result};
use setql_core::execution::{
    EmptySource, Evaluation, Executor, FragmentBuilder, InputSpec, PlanBuilder,
};
use tracing::{debug, trace, warn};

/// Lowers bound expression trees.
#[derive(Default)]
pub struct Emitter<'a> {
    folder: Option<&'a Executor>,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter without constant folding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds immutable, input-free subtrees by evaluating them with
    /// `executor` at compile time.
    #[must_use]
    pub fn with_folding(mut self, executor: &'a Executor) -> Self {
        self.folder = Some(executor);
        self
    }

    /// Checks `token` between node visits.
    #[must_use]
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Lowers a bound tree through `builder`.
    ///
    /// # Errors
    ///
    /// Fails with a lowering error if the target cannot express a fragment,
    /// `NotResolved` if a node is unbound, or `Cancelled`.
    pub fn emit<B: FragmentBuilder>(&self, node: &ExprNode, builder: &mut B) -> Result<B::Fragment> {
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }
        let info = node.try_info()?;

        if self.folder.is_some()
            && matches!(node.kind(), ExprKind::Call { .. })
            && info.volatility == Volatility::Immutable
            && !node.has_inputs()
        {
            if let Some(values) = self.fold(node) {
                trace!(rows = values.len(), "folded constant subtree");
                return Ok(builder.literal(info.ty, values));
            }
        }

        match node.kind() {
            ExprKind::Literal(value) => Ok(builder.literal(value.logical_type(), vec![value.clone()])),
            ExprKind::Set {
                element_type,
                values,
            } => Ok(builder.literal(*element_type, values.clone())),
            ExprKind::Input(input) => Ok(builder.input(InputSpec {
                name: input.name.clone(),
                ty: input.ty,
                cardinality: input.cardinality,
                reuse: input.volatility.is_reusable(),
            })),
            ExprKind::Call { args, .. } => self.emit_call(info, args, builder),
        }
    }

    /// Evaluates a subtree at compile time. Returns `None` when folding is
    /// disabled or evaluation fails; the caller then emits the subtree as is.
    fn fold(&self, node: &ExprNode) -> Option<Vec<Value>> {
        let executor = self.folder?;
        let inner = Emitter {
            folder: None,
            cancel: self.cancel,
        };
        let fragment = match inner.emit(node, &mut PlanBuilder::new()) {
            Ok(fragment) => fragment,
            Err(err) => {
                debug!(%err, "subtree not foldable");
                return None;
            }
        };
        match executor.execute(&fragment, &EmptySource) {
            Ok(values) => Some(values),
            Err(err) => {
                warn!(%err, "constant folding failed, deferring to evaluation");
                None
            }
        }
    }

    fn emit_call<B: FragmentBuilder>(
        &self,
        info: &NodeInfo,
        args: &[ExprNode],
        builder: &mut B,
    ) -> Result<B::Fragment> {
        let resolved = info.call.as_ref().ok_or(ResolveError::NotResolved)?;
        let signature = &resolved.signature;

        let mut operands = Vec::with_capacity(args.len() + resolved.defaults_used.len());
        for (index, arg) in args.iter().enumerate() {
            let mut fragment = self.emit(arg, builder)?;
            if let Some(coercion) = resolved.coercion(index) {
                fragment = builder.cast(fragment, coercion.from, coercion.to)?;
            }
            operands.push(fragment);
        }
        for (ty, value) in resolved.defaults() {
            operands.push(builder.literal(ty, vec![value.clone()]));
        }
        let arity = operands.len();
        let mut operands = operands.into_iter();
        let mut next = || {
            operands
                .next()
                .ok_or_else(|| Error::Internal(format!("{} is missing an operand", signature.name)))
        };

        let fragment = match &signature.implementation {
            OperatorImpl::Membership {
                negated,
                compare_as,
            } => {
                let mut element = next()?;
                let mut set = next()?;
                if let Some(target) = *compare_as {
                    element = convert(builder, element, resolved.param_types[0], target)?;
                    set = convert(builder, set, resolved.param_types[1], target)?;
                }
                builder.membership(element, set, *negated)
            }
            OperatorImpl::Exists => {
                let input = next()?;
                builder.exists(input)
            }
            OperatorImpl::Distinct => {
                let input = next()?;
                builder.distinct(input)
            }
            OperatorImpl::Union => {
                let inputs = (0..arity).map(|_| next()).collect::<Result<Vec<_>>>()?;
                builder.union_all(inputs)
            }
            OperatorImpl::Coalesce => {
                let left = next()?;
                let right = next()?;
                // Only a constant fallback is safe to evaluate unconditionally;
                // any other operand may fail and must not run when unused.
                let constant_fallback = args.get(1).is_some_and(|r| {
                    matches!(r.kind(), ExprKind::Literal(_) | ExprKind::Set { .. })
                });
                let evaluation = if constant_fallback {
                    Evaluation::Eager
                } else {
                    Evaluation::Lazy
                };
                builder.coalesce(left, right, evaluation)
            }
            OperatorImpl::Conditional => {
                let if_true = next()?;
                let condition = next()?;
                let if_false = next()?;
                builder.conditional(condition, if_true, if_false)
            }
            OperatorImpl::EngineFunction { name } => {
                let mut call_args = Vec::with_capacity(arity);
                for index in 0..arity {
                    let mode = signature
                        .parameter_for(index)
                        .map_or(SetMode::Singleton, |p| p.mode);
                    call_args.push((mode, next()?));
                }
                builder.call(name, call_args, signature.volatility)?
            }
        };
        Ok(fragment)
    }
}

fn convert<B: FragmentBuilder>(
    builder: &mut B,
    fragment: B::Fragment,
    from: LogicalType,
    to: LogicalType,
) -> Result<B::Fragment> {
    if from == to {
        return Ok(fragment);
    }
    Ok(builder.cast(fragment, from, to)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::query::binder::Binder;
    use crate::query::expr::InputRef;
    use crate::query::optimizer::CardinalityEstimator;
    use setql_common::types::Cardinality;
    use setql_common::utils::error::LoweringError;
    use setql_core::execution::Fragment;

    fn bound(mut node: ExprNode) -> ExprNode {
        let catalog = Catalog::builtin().unwrap();
        let estimator = CardinalityEstimator::new();
        Binder::new(&catalog, &estimator).bind(&mut node).unwrap();
        node
    }

    fn input(name: &str, ty: LogicalType, volatility: Volatility) -> ExprNode {
        ExprNode::input(InputRef::new(name, ty, Cardinality::Many).with_volatility(volatility))
    }

    #[test]
    fn test_coercion_becomes_cast() {
        let tree = bound(ExprNode::call(
            "UNION",
            vec![
                input("a", LogicalType::Int32, Volatility::Stable),
                input("b", LogicalType::Int64, Volatility::Stable),
            ],
        ));
        let fragment = Emitter::new().emit(&tree, &mut PlanBuilder::new()).unwrap();
        match fragment {
            Fragment::UnionAll(children) => {
                assert!(matches!(
                    &children[0],
                    Fragment::Cast {
                        from: LogicalType::Int32,
                        to: LogicalType::Int64,
                        ..
                    }
                ));
                assert!(matches!(&children[1], Fragment::Input(_)));
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_cast_is_fatal() {
        let tree = bound(ExprNode::call(
            "UNION",
            vec![
                input("a", LogicalType::Int32, Volatility::Stable),
                input("b", LogicalType::Int64, Volatility::Stable),
            ],
        ));
        let mut builder = PlanBuilder::new().deny_cast(LogicalType::Int32, LogicalType::Int64);
        let err = Emitter::new().emit(&tree, &mut builder).unwrap_err();
        assert_eq!(
            err,
            Error::Lowering(LoweringError::UnsupportedCast {
                from: LogicalType::Int32,
                to: LogicalType::Int64,
            })
        );
    }

    #[test]
    fn test_cross_type_membership_compares_as_decimal() {
        let tree = bound(ExprNode::call(
            "IN",
            vec![
                input("price", LogicalType::Decimal, Volatility::Stable),
                input("rates", LogicalType::Float64, Volatility::Stable),
            ],
        ));
        let fragment = Emitter::new().emit(&tree, &mut PlanBuilder::new()).unwrap();
        match fragment {
            Fragment::Membership { element, set, .. } => {
                assert!(matches!(*element, Fragment::Input(_)));
                assert!(matches!(
                    *set,
                    Fragment::Cast {
                        from: LogicalType::Float64,
                        to: LogicalType::Decimal,
                        ..
                    }
                ));
            }
            other => panic!("expected membership, got {other:?}"),
        }
    }

    #[test]
    fn test_coalesce_eager_only_for_constant_fallback() {
        let lazy = bound(ExprNode::call(
            "??",
            vec![
                ExprNode::empty_set(),
                input("fallback", LogicalType::Int64, Volatility::Volatile),
            ],
        ));
        let fragment = Emitter::new().emit(&lazy, &mut PlanBuilder::new()).unwrap();
        assert!(matches!(
            fragment,
            Fragment::Coalesce {
                evaluation: Evaluation::Lazy,
                ..
            }
        ));

        let eager = bound(ExprNode::call(
            "??",
            vec![
                input("nick", LogicalType::String, Volatility::Stable),
                ExprNode::literal("anonymous"),
            ],
        ));
        let fragment = Emitter::new().emit(&eager, &mut PlanBuilder::new()).unwrap();
        assert!(matches!(
            fragment,
            Fragment::Coalesce {
                evaluation: Evaluation::Eager,
                ..
            }
        ));
    }

    #[test]
    fn test_immutable_call_fallback_stays_lazy() {
        let tree = bound(ExprNode::call(
            "??",
            vec![
                input("nick", LogicalType::Int64, Volatility::Stable),
                ExprNode::call(
                    "IF",
                    vec![
                        ExprNode::literal(2i64),
                        ExprNode::set(LogicalType::Bool, vec![]),
                        ExprNode::literal(3i64),
                    ],
                ),
            ],
        ));
        assert_eq!(
            tree.children()[1].info().map(|i| i.volatility),
            Some(Volatility::Immutable)
        );
        let fragment = Emitter::new().emit(&tree, &mut PlanBuilder::new()).unwrap();
        assert!(matches!(
            fragment,
            Fragment::Coalesce {
                evaluation: Evaluation::Lazy,
                ..
            }
        ));
    }

    #[test]
    fn test_volatile_inputs_not_reused() {
        let tree = bound(input("now", LogicalType::Int64, Volatility::Volatile));
        let fragment = Emitter::new().emit(&tree, &mut PlanBuilder::new()).unwrap();
        assert!(matches!(fragment, Fragment::Input(InputSpec { reuse: false, .. })));
    }

    #[test]
    fn test_folding_replaces_constant_subtree() {
        let tree = bound(ExprNode::call(
            "DISTINCT",
            vec![ExprNode::set(
                LogicalType::Int64,
                vec![Value::Int64(1), Value::Int64(1), Value::Int64(2)],
            )],
        ));
        let executor = Executor::default();
        let fragment = Emitter::new()
            .with_folding(&executor)
            .emit(&tree, &mut PlanBuilder::new())
            .unwrap();
        assert_eq!(
            fragment,
            Fragment::Literal {
                ty: LogicalType::Int64,
                values: vec![Value::Int64(1), Value::Int64(2)],
            }
        );
    }

    #[test]
    fn test_failed_folding_emits_unfolded() {
        let tree = bound(ExprNode::call(
            "IF",
            vec![
                ExprNode::literal(1i64),
                ExprNode::set(LogicalType::Bool, vec![]),
                ExprNode::literal(2i64),
            ],
        ));
        let executor = Executor::default();
        let fragment = Emitter::new()
            .with_folding(&executor)
            .emit(&tree, &mut PlanBuilder::new())
            .unwrap();
        assert!(matches!(fragment, Fragment::Conditional { .. }));
    }

    #[test]
    fn test_unbound_tree_rejected() {
        let tree = ExprNode::call("EXISTS", vec![ExprNode::empty_set()]);
        let err = Emitter::new().emit(&tree, &mut PlanBuilder::new()).unwrap_err();
        assert_eq!(err, Error::Resolve(ResolveError::NotResolved));
    }
}
