//! Bag union.

use setql_common::types::Value;

/// Concatenates `inputs`, preserving multiplicity and order.
#[must_use]
pub fn union_all(inputs: Vec<Vec<Value>>) -> Vec<Value> {
    let total = inputs.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for input in inputs {
        out.extend(input);
    }
    out
}
