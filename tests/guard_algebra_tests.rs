// Copyright 2025 Cowboy AI, LLC.

use cim_typeguard::prelude::*;
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        any::<i64>().prop_map(|n| Value::BigInt(i128::from(n))),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Set),
            proptest::collection::vec(("[a-c]", inner), 0..4).prop_map(Value::object),
        ]
    })
}

/// A small fixed palette of guards, indexed so proptest can pick among them
fn palette() -> Vec<Guard> {
    vec![
        is_number().boxed(),
        is_string().boxed(),
        is_object().boxed(),
        is_null().boxed(),
        literal(["a", "b"]).boxed(),
        is_number().array().boxed(),
        object([("a", is_string().boxed())]).boxed(),
        index_record(is_boolean().boxed()).boxed(),
        tuple([is_number().boxed(), is_string().optional().boxed()]).boxed(),
    ]
}

fn pick(index: usize) -> Guard {
    let guards = palette();
    guards[index % guards.len()].clone()
}

proptest! {
    #[test]
    fn guards_are_deterministic(v in value(), i in 0usize..9) {
        let guard = pick(i);
        prop_assert_eq!(guard.test(&v), guard.test(&v));
    }

    #[test]
    fn union_is_commutative(v in value(), i in 0usize..9, j in 0usize..9) {
        let (a, b) = (pick(i), pick(j));
        prop_assert_eq!(
            union([a.clone(), b.clone()]).test(&v),
            union([b, a]).test(&v)
        );
    }

    #[test]
    fn intersection_is_commutative(v in value(), i in 0usize..9, j in 0usize..9) {
        let (a, b) = (pick(i), pick(j));
        prop_assert_eq!(
            intersection([a.clone(), b.clone()]).test(&v),
            intersection([b, a]).test(&v)
        );
    }

    #[test]
    fn union_is_associative(v in value(), i in 0usize..9, j in 0usize..9, k in 0usize..9) {
        let (a, b, c) = (pick(i), pick(j), pick(k));
        let left = union([union([a.clone(), b.clone()]).boxed(), c.clone()]);
        let right = union([a, union([b, c]).boxed()]);
        prop_assert_eq!(left.test(&v), right.test(&v));
    }

    #[test]
    fn empty_union_and_intersection_are_identities(v in value(), i in 0usize..9) {
        let guard = pick(i);
        prop_assert_eq!(union([guard.clone(), union([]).boxed()]).test(&v), guard.test(&v));
        prop_assert_eq!(
            intersection([guard.clone(), intersection([]).boxed()]).test(&v),
            guard.test(&v)
        );
        prop_assert!(!union([]).test(&v));
        prop_assert!(intersection([]).test(&v));
    }

    #[test]
    fn optional_and_maybe_widen_by_one_sentinel(v in value(), i in 0usize..9) {
        let guard = pick(i);
        prop_assert_eq!(
            guard.optional().test(&v),
            matches!(v, Value::Undefined) || guard.test(&v)
        );
        prop_assert_eq!(guard.maybe().test(&v), matches!(v, Value::Null) || guard.test(&v));
    }

    #[test]
    fn refine_narrows(v in value(), i in 0usize..9) {
        let guard = pick(i);
        let narrowed = guard.refine(|value| matches!(value, Value::Array(items) if items.is_empty()));
        prop_assert!(!narrowed.test(&v) || guard.test(&v));
    }

    #[test]
    fn unknown_accepts_everything(v in value()) {
        prop_assert!(is_unknown().test(&v));
    }

    #[test]
    fn literal_extract_keeps_original_order(values in proptest::collection::vec(0i32..10, 0..8),
                                            subset in proptest::collection::vec(0i32..10, 0..8)) {
        let guard = literal(values.clone());
        let extracted = guard.extract(subset.clone());
        let expected: Vec<Literal> = guard
            .values()
            .iter()
            .filter(|value| subset.iter().any(|s| Literal::from(*s) == **value))
            .cloned()
            .collect();
        prop_assert_eq!(extracted.values().to_vec(), expected);
    }
}
