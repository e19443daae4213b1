//! Overload resolution.
//!
//! Picks the overload of an operator name that accepts the argument types
//! at the lowest total promotion distance. All `anytype` parameters of one
//! signature share a single binding, which is the cheapest common
//! promotion target of the arguments passed to them.

use crate::catalog::{Catalog, DeclaredType, OperatorSignature};
use setql_common::types::{LogicalType, Value};
use setql_common::utils::error::ResolveError;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// An implicit conversion the emitter must make explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coercion {
    /// Argument position.
    pub arg: usize,
    /// Type of the argument.
    pub from: LogicalType,
    /// Type the parameter expects.
    pub to: LogicalType,
}

/// The outcome of resolving one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSignature {
    /// The chosen overload.
    pub signature: Arc<OperatorSignature>,
    /// Type bound to `anytype`; `None` when the signature is not generic or
    /// only untyped empty sets were passed to its generic parameters.
    pub binding: Option<LogicalType>,
    /// Argument types as supplied.
    pub arg_types: SmallVec<[LogicalType; 4]>,
    /// Concrete parameter type per argument.
    pub param_types: SmallVec<[LogicalType; 4]>,
    /// Indices of parameters filled from their default.
    pub defaults_used: SmallVec<[usize; 2]>,
    /// Element type of the result.
    pub return_type: LogicalType,
    /// Total promotion distance.
    pub cost: u32,
}

impl ResolvedSignature {
    /// Returns the conversions required for the arguments, in order.
    #[must_use]
    pub fn coercions(&self) -> Vec<Coercion> {
        (0..self.arg_types.len())
            .filter_map(|arg| self.coercion(arg))
            .collect()
    }

    /// Returns the conversion required for argument `arg`, if any.
    #[must_use]
    pub fn coercion(&self, arg: usize) -> Option<Coercion> {
        let from = *self.arg_types.get(arg)?;
        let to = *self.param_types.get(arg)?;
        (from != to).then_some(Coercion { arg, from, to })
    }

    /// Returns the default values to append after the supplied arguments.
    pub fn defaults(&self) -> impl Iterator<Item = (LogicalType, &Value)> {
        self.defaults_used.iter().filter_map(|&index| {
            let param = self.signature.params.get(index)?;
            let value = param.default.as_ref()?;
            Some((value.logical_type(), value))
        })
    }
}

enum Rejection {
    /// An argument cannot be converted to its parameter type.
    Type,
    /// The generic arguments have no common type.
    Binding(String),
}

/// Resolves a call of `name` with arguments of `arg_types`.
///
/// # Errors
///
/// - `NoMatchingOperator` if no overload accepts the arguments
/// - `TypeMismatch` if an overload failed only because its generic
///   arguments could not be bound to one type
/// - `AmbiguousOperator` if several overloads match at the same cost
pub fn resolve(
    catalog: &Catalog,
    name: &str,
    arg_types: &[LogicalType],
) -> Result<ResolvedSignature, ResolveError> {
    let mut best: Vec<ResolvedSignature> = Vec::new();
    let mut conflict: Option<String> = None;

    for signature in catalog.lookup(name) {
        if !signature.accepts_arity(arg_types.len()) {
            continue;
        }
        match try_match(signature, arg_types) {
            Ok(candidate) => match best.first().map(|b| b.cost) {
                Some(cost) if candidate.cost > cost => {}
                Some(cost) if candidate.cost == cost => best.push(candidate),
                _ => best = vec![candidate],
            },
            Err(Rejection::Binding(detail)) => {
                conflict.get_or_insert(detail);
            }
            Err(Rejection::Type) => {}
        }
    }

    let rendered = || render_types(arg_types);
    match best.len() {
        0 => Err(match conflict {
            Some(detail) => ResolveError::TypeMismatch {
                name: name.to_string(),
                arg_types: rendered(),
                detail,
            },
            None => ResolveError::NoMatchingOperator {
                name: name.to_string(),
                arg_types: rendered(),
            },
        }),
        1 => {
            let chosen = best.remove(0);
            debug!(
                operator = %chosen.signature.specialized_name(),
                cost = chosen.cost,
                "resolved {}({})",
                name,
                rendered()
            );
            Ok(chosen)
        }
        _ => Err(ResolveError::AmbiguousOperator {
            name: name.to_string(),
            arg_types: rendered(),
            candidates: best
                .iter()
                .map(|c| c.signature.specialized_name())
                .collect(),
        }),
    }
}

fn try_match(
    signature: &Arc<OperatorSignature>,
    arg_types: &[LogicalType],
) -> Result<ResolvedSignature, Rejection> {
    let mut cost = 0u32;
    let mut generic_args: SmallVec<[LogicalType; 4]> = SmallVec::new();

    for (index, &arg) in arg_types.iter().enumerate() {
        let param = signature.parameter_for(index).ok_or(Rejection::Type)?;
        match param.ty {
            DeclaredType::Concrete(target) => {
                cost += arg.promotion_distance(target).ok_or(Rejection::Type)?;
            }
            DeclaredType::Any => generic_args.push(arg),
        }
    }

    let binding = if generic_args.iter().all(|t| *t == LogicalType::Unknown) {
        None
    } else {
        let (target, distance) =
            LogicalType::common_supertype(&generic_args).ok_or_else(|| {
                Rejection::Binding(format!(
                    "anytype cannot be bound to a common type of {}",
                    render_types(&generic_args)
                ))
            })?;
        cost += distance;
        Some(target)
    };

    let param_types = arg_types
        .iter()
        .enumerate()
        .map(|(index, &arg)| match signature.parameter_for(index).map(|p| p.ty) {
            Some(DeclaredType::Concrete(target)) => target,
            _ => binding.unwrap_or(arg),
        })
        .collect();

    let defaults_used = (arg_types.len()..signature.positional_count())
        .filter(|&index| signature.params[index].default.is_some())
        .collect();

    let return_type = match signature.returns.ty {
        DeclaredType::Concrete(ty) => ty,
        DeclaredType::Any => binding.unwrap_or(LogicalType::Unknown),
    };

    Ok(ResolvedSignature {
        signature: Arc::clone(signature),
        binding,
        arg_types: arg_types.iter().copied().collect(),
        param_types,
        defaults_used,
        return_type,
        cost,
    })
}

fn render_types(types: &[LogicalType]) -> String {
    types
        .iter()
        .map(LogicalType::name)
        .collect::<Vec<_>>()
        .join(", ")
}
