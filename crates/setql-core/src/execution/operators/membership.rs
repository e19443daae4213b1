//! Element-wise membership.

use hashbrown::HashSet;
use setql_common::types::Value;

/// Tests each element of `elements` against `set`.
///
/// Produces one boolean per element. An empty `set` produces an empty
/// result regardless of `negated`: there is nothing to compare against.
#[must_use]
pub fn membership(elements: &[Value], set: &[Value], negated: bool) -> Vec<Value> {
    if set.is_empty() {
        return Vec::new();
    }
    // Small sets are cheaper to scan than to hash.
    if set.len() <= 8 {
        return elements
            .iter()
            .map(|e| Value::Bool(set.contains(e) != negated))
            .collect();
    }
    let lookup: HashSet<&Value> = set.iter().collect();
    elements
        .iter()
        .map(|e| Value::Bool(lookup.contains(e) != negated))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int64).collect()
    }

    #[test]
    fn test_in_and_not_in() {
        let set = ints(&[1, 2, 3]);
        assert_eq!(membership(&ints(&[2]), &set, false), vec![Value::Bool(true)]);
        assert_eq!(membership(&ints(&[5]), &set, false), vec![Value::Bool(false)]);
        assert_eq!(membership(&ints(&[5]), &set, true), vec![Value::Bool(true)]);
    }

    #[test]
    fn test_one_result_per_element() {
        let set = ints(&[1, 3]);
        let out = membership(&ints(&[1, 2, 3]), &set, false);
        assert_eq!(
            out,
            vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]
        );
    }

    #[test]
    fn test_empty_set_gives_empty() {
        assert!(membership(&ints(&[1]), &[], false).is_empty());
        assert!(membership(&ints(&[1]), &[], true).is_empty());
    }

    #[test]
    fn test_hashed_path_matches_scan() {
        let set: Vec<Value> = (0..100).map(|v| Value::Int64(v * 2)).collect();
        let out = membership(&ints(&[4, 5]), &set, false);
        assert_eq!(out, vec![Value::Bool(true), Value::Bool(false)]);
    }
}
