//! Property tests for the set kernels.

use proptest::prelude::*;
use setql_core::execution::operators::{distinct, membership, union_all};
use setql_common::types::Value;

fn int_set() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((-5i64..5).prop_map(Value::Int64), 0..12)
}

proptest! {
    #[test]
    fn distinct_is_idempotent(input in int_set()) {
        let once = distinct(input);
        let twice = distinct(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn distinct_never_grows(input in int_set()) {
        let len = input.len();
        prop_assert!(distinct(input).len() <= len);
    }

    #[test]
    fn union_counts_add(a in int_set(), b in int_set()) {
        let expected = a.len() + b.len();
        prop_assert_eq!(union_all(vec![a, b]).len(), expected);
    }

    #[test]
    fn membership_is_elementwise(elements in int_set(), set in int_set()) {
        let out = membership(&elements, &set, false);
        if set.is_empty() {
            prop_assert!(out.is_empty());
        } else {
            prop_assert_eq!(out.len(), elements.len());
        }
    }

    #[test]
    fn not_in_negates_in(elements in int_set(), set in int_set()) {
        let positive = membership(&elements, &set, false);
        let negative = membership(&elements, &set, true);
        for (p, n) in positive.iter().zip(&negative) {
            prop_assert_eq!(p.as_bool(), n.as_bool().map(|b| !b));
        }
    }
}
