//! Volatility classification of expression subtrees.

use super::expr::{ExprKind, ExprNode};
use setql_common::types::Volatility;
use setql_common::utils::error::ResolveError;

/// Classifies a subtree: the least optimizable of the node's own
/// volatility and that of all its descendants.
///
/// Constants are immutable, inputs carry their declared volatility, and a
/// call contributes the volatility of the overload it resolved to.
///
/// # Errors
///
/// Returns `ResolveError::NotResolved` if a call in the subtree has not
/// been bound.
pub fn classify(node: &ExprNode) -> Result<Volatility, ResolveError> {
    let own = match node.kind() {
        ExprKind::Literal(_) | ExprKind::Set { .. } => Volatility::Immutable,
        ExprKind::Input(input) => input.volatility,
        ExprKind::Call { .. } => {
            node.try_info()?
                .call
                .as_ref()
                .ok_or(ResolveError::NotResolved)?
                .signature
                .volatility
        }
    };
    node.children()
        .iter()
        .try_fold(own, |acc, child| Ok(acc.combine(classify(child)?)))
}

/// Combines a declared volatility with already classified children.
#[must_use]
pub fn combine_all(own: Volatility, children: impl IntoIterator<Item = Volatility>) -> Volatility {
    children.into_iter().fold(own, Volatility::combine)
}
