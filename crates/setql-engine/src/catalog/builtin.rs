//! Declarations of the built-in set operators.

use super::signature::{DeclaredType, OperatorImpl, OperatorKind, OperatorSignature, ParameterSpec};
use setql_common::types::{LogicalType, SetMode};

/// Returns the built-in operator declarations in registration order.
#[must_use]
pub fn builtin_signatures() -> Vec<OperatorSignature> {
    let mut signatures = Vec::with_capacity(11);
    for (name, negated) in [("IN", false), ("NOT IN", true)] {
        signatures.push(membership(name, negated, DeclaredType::Any, DeclaredType::Any, None));
        // decimal and float64 never promote into each other, so the mixed
        // comparisons are declared explicitly and compared as decimals.
        signatures.push(membership(
            name,
            negated,
            LogicalType::Decimal.into(),
            LogicalType::Float64.into(),
            Some(LogicalType::Decimal),
        ));
        signatures.push(membership(
            name,
            negated,
            LogicalType::Float64.into(),
            LogicalType::Decimal.into(),
            Some(LogicalType::Decimal),
        ));
    }

    signatures.push(
        OperatorSignature::new("EXISTS", OperatorKind::Prefix, OperatorImpl::Exists)
            .param(ParameterSpec::new("s", DeclaredType::Any).set_of())
            .returns(LogicalType::Bool, SetMode::Singleton),
    );
    signatures.push(
        OperatorSignature::new("DISTINCT", OperatorKind::Prefix, OperatorImpl::Distinct)
            .param(ParameterSpec::new("s", DeclaredType::Any).set_of())
            .returns(DeclaredType::Any, SetMode::SetOf),
    );
    signatures.push(
        OperatorSignature::new("UNION", OperatorKind::Infix, OperatorImpl::Union)
            .param(ParameterSpec::new("s1", DeclaredType::Any).set_of())
            .param(ParameterSpec::new("s2", DeclaredType::Any).set_of())
            .returns(DeclaredType::Any, SetMode::SetOf),
    );
    signatures.push(
        OperatorSignature::new("??", OperatorKind::Infix, OperatorImpl::Coalesce)
            .param(ParameterSpec::new("l", DeclaredType::Any).optional())
            .param(ParameterSpec::new("r", DeclaredType::Any).set_of())
            .returns(DeclaredType::Any, SetMode::SetOf),
    );
    signatures.push(
        OperatorSignature::new("IF", OperatorKind::Ternary, OperatorImpl::Conditional)
            .param(ParameterSpec::new("if_true", DeclaredType::Any).set_of())
            .param(ParameterSpec::new("condition", LogicalType::Bool))
            .param(ParameterSpec::new("if_false", DeclaredType::Any).set_of())
            .returns(DeclaredType::Any, SetMode::SetOf),
    );
    signatures
}

fn membership(
    name: &str,
    negated: bool,
    element: DeclaredType,
    set: DeclaredType,
    compare_as: Option<LogicalType>,
) -> OperatorSignature {
    OperatorSignature::new(
        name,
        OperatorKind::Infix,
        OperatorImpl::Membership {
            negated,
            compare_as,
        },
    )
    .param(ParameterSpec::new("e", element))
    .param(ParameterSpec::new("s", set).set_of())
    .returns(LogicalType::Bool, SetMode::Singleton)
}
