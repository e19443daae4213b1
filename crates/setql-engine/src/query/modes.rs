//! Set-mode and cardinality propagation.
//!
//! A call's result cardinality is a function of its arguments'
//! cardinalities alone. Singleton and optional parameters iterate their
//! argument element-wise, so their cardinalities multiply; `SET OF`
//! parameters receive the whole set and contribute nothing to the product.

use crate::catalog::{OperatorImpl, OperatorSignature};
use setql_common::types::{Cardinality, SetMode};

/// Returns the set-mode of a call whose arguments have `arg_modes`.
#[must_use]
pub fn propagate(signature: &OperatorSignature, arg_modes: &[SetMode]) -> SetMode {
    let cards: Vec<Cardinality> = arg_modes.iter().map(|m| m.max_cardinality()).collect();
    propagate_cardinality(signature, &cards).mode()
}

/// Returns the cardinality of a call whose arguments have `arg_cards`.
///
/// Missing trailing arguments (filled from defaults) count as `One`.
#[must_use]
pub fn propagate_cardinality(signature: &OperatorSignature, arg_cards: &[Cardinality]) -> Cardinality {
    let arg = |index: usize| arg_cards.get(index).copied().unwrap_or(Cardinality::One);

    match &signature.implementation {
        OperatorImpl::Exists => Cardinality::One,
        OperatorImpl::Distinct => arg(0),
        OperatorImpl::Union => arg_cards
            .iter()
            .fold(Cardinality::Empty, |acc, c| acc.sum(*c)),
        OperatorImpl::Coalesce => match arg(0) {
            Cardinality::Empty => arg(1),
            Cardinality::One => Cardinality::One,
            Cardinality::AtMostOne => Cardinality::One.join(arg(1)),
            Cardinality::Many => Cardinality::Many,
        },
        OperatorImpl::Membership { .. } => match arg(1) {
            Cardinality::Empty => Cardinality::Empty,
            Cardinality::One => arg(0),
            // A set that may turn out empty at runtime may empty the result.
            Cardinality::AtMostOne | Cardinality::Many => arg(0).join(Cardinality::Empty),
        },
        OperatorImpl::Conditional => arg(0).join(arg(2)),
        OperatorImpl::EngineFunction { .. } => {
            elementwise_product(signature, arg_cards).product(signature.returns.mode.max_cardinality())
        }
    }
}

/// Number of applications of an element-wise call.
fn elementwise_product(signature: &OperatorSignature, arg_cards: &[Cardinality]) -> Cardinality {
    arg_cards
        .iter()
        .enumerate()
        .fold(Cardinality::One, |acc, (index, card)| {
            let factor = match signature.parameter_for(index).map(|p| p.mode) {
                Some(SetMode::Singleton) => *card,
                // An empty optional argument still gets one application.
                Some(SetMode::Optional) if card.at_most_one() => Cardinality::One,
                Some(SetMode::Optional) => Cardinality::Many,
                Some(SetMode::SetOf) | None => Cardinality::One,
            };
            acc.product(factor)
        })
}
