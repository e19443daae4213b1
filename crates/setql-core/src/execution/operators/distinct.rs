//! Deduplication.

use hashbrown::HashSet;
use setql_common::types::Value;

/// Removes duplicates, keeping the first occurrence of each value.
#[must_use]
pub fn distinct(input: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::with_capacity(input.len());
    input
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
