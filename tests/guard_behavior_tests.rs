// Copyright 2025 Cowboy AI, LLC.

//! End-to-end behavior of the public combinator surface

use cim_typeguard::prelude::*;
use cim_typeguard::{canonical_enum_values, Function};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn tree() -> cim_typeguard::ObjectGuard {
    object_with(|this| {
        [
            ("value", is_number().boxed()),
            ("left", this.maybe().boxed()),
            ("right", this.maybe().boxed()),
        ]
    })
}

#[test_case(Value::from(5), TypeTag::Number)]
#[test_case(Value::from("five"), TypeTag::String)]
#[test_case(Value::from(true), TypeTag::Boolean)]
#[test_case(Value::BigInt(5), TypeTag::BigInt)]
#[test_case(Value::from(Symbol::anonymous()), TypeTag::Symbol)]
#[test_case(Value::from(Function::new("handler")), TypeTag::Function)]
#[test_case(Value::map([("k", 1)]), TypeTag::Object)]
#[test_case(Value::Undefined, TypeTag::Undefined)]
fn type_tags_partition_values(value: Value, tag: TypeTag) {
    let all = [
        TypeTag::Number,
        TypeTag::String,
        TypeTag::Boolean,
        TypeTag::BigInt,
        TypeTag::Symbol,
        TypeTag::Function,
        TypeTag::Object,
        TypeTag::Undefined,
    ];
    let accepted: Vec<TypeTag> = all
        .into_iter()
        .filter(|candidate| type_of(*candidate).test(&value))
        .collect();
    assert_eq!(accepted, vec![tag]);
}

#[test]
fn null_has_no_type_tag() {
    for tag in [TypeTag::Object, TypeTag::Undefined] {
        assert!(!type_of(tag).test(&Value::Null));
    }
}

#[test_case(Value::array([5]), true; "missing trailing optional")]
#[test_case(Value::array([5, 6]), true; "full length")]
#[test_case(Value::array([Value::from(5), Value::Undefined]), true; "explicit undefined")]
#[test_case(Value::array([5, 6, 7]), false; "longer than template")]
#[test_case(Value::array(["5"]), false; "wrong element")]
#[test_case(Value::object([("0", 5)]), false; "array-like object")]
fn tuple_with_trailing_optional(candidate: Value, expected: bool) {
    let guard = tuple([is_number().boxed(), is_number().optional().boxed()]);
    assert_eq!(guard.test(&candidate), expected);
}

#[test]
fn enum_canonicalization_drops_reverse_entries() {
    let guard = enumeration([
        ("A", Literal::from(0)),
        ("B", Literal::from(1)),
        ("0", Literal::from("A")),
        ("1", Literal::from("B")),
        ("C", Literal::from("x")),
    ]);
    assert_eq!(
        guard.values().to_vec(),
        vec![Literal::from(0), Literal::from(1), Literal::from("x")]
    );
    assert_eq!(canonical_enum_values(guard.entries()), guard.values().to_vec());
}

#[test]
fn literal_extract_and_exclude() {
    let guard = literal([1, 2, 3]);
    assert_eq!(
        guard.extract([2, 3, 4]).values().to_vec(),
        vec![Literal::from(2), Literal::from(3)]
    );
    assert_eq!(
        guard.exclude([2]).values().to_vec(),
        vec![Literal::from(1), Literal::from(3)]
    );
}

#[test]
fn self_referential_object_template() {
    let guard = tree();
    let leaf = Value::object([
        ("value", Value::from(6)),
        ("left", Value::Null),
        ("right", Value::Null),
    ]);
    assert!(guard.test(&leaf));

    let missing_left = Value::object([("value", Value::from(6)), ("right", Value::Null)]);
    assert!(!guard.test(&missing_left));

    let with_extra = Value::object([
        ("value", Value::from(6)),
        ("left", Value::Null),
        ("right", Value::Null),
        ("extra", Value::Null),
    ]);
    assert!(guard.test(&with_extra));

    let nested = Value::object([
        ("value", Value::from(1)),
        ("left", leaf.clone()),
        ("right", Value::object([("value", Value::from("two")), ("left", Value::Null), ("right", Value::Null)])),
    ]);
    assert!(!guard.test(&nested));
}

#[test]
fn index_record_requires_plain_objects() {
    let guard = index_record(is_number().boxed());
    let date = Class::new("Date");

    assert!(!guard.test(&Value::from(Object::instance(&date))));
    assert!(!guard.test(&Value::from(Object::instance(&date).with("time", 0))));
    assert!(!guard.test(&Value::array([1, 2])));
    assert!(guard.test(&Value::object(Vec::<(&str, Value)>::new())));
}

#[test]
fn json_documents_check_directly() {
    let order = object([
        ("id", is_string().boxed()),
        ("lines", object([("sku", is_string().boxed()), ("qty", is_number().boxed())]).array().boxed()),
        ("note", is_string().optional().boxed()),
    ]);

    let good = Value::from(serde_json::json!({
        "id": "o-1",
        "lines": [{ "sku": "a", "qty": 1 }, { "sku": "b", "qty": 2 }]
    }));
    let bad = Value::from(serde_json::json!({
        "id": "o-2",
        "lines": [{ "sku": "a", "qty": "many" }]
    }));
    assert!(order.test(&good));
    assert!(!order.test(&bad));
}

#[test]
fn recursive_and_lazy_agree() {
    let nested = recursive(|this| union([is_number().boxed(), this.array().boxed()]));
    let handle = nested.clone().boxed();
    let deferred = lazy(move || handle.clone());

    let samples = [
        Value::from(1),
        Value::array([Value::array([Value::from(1)])]),
        Value::array([Value::from("x")]),
        Value::Null,
    ];
    for sample in &samples {
        assert_eq!(nested.test(sample), deferred.test(sample));
    }
}

#[test]
fn predicates_filter_collections() {
    let values = vec![Value::from(1), Value::Null, Value::from("a"), Value::Undefined];
    let present = is_null().or([is_undefined().boxed()]);

    assert_eq!(values.iter().filter(|v| !present.test(v)).count(), 2);
    assert_eq!(values.iter().position(present.predicate()), Some(1));
    assert!(values.iter().any(is_string().predicate()));
}
