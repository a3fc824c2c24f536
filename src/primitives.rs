// Copyright 2025 Cowboy AI, LLC.

//! Primitive guards: type tags, literal sets, prototype chains, enums

use std::fmt;
use std::sync::Arc;

use crate::guard::{GuardMeta, TypeGuard};
use crate::literal::Literal;
use crate::schema::{Projection, SchemaNode};
use crate::value::{Class, Prototype, TypeTag, Value};

/// Accepts values of one `typeof` category
#[derive(Debug, Clone)]
pub struct TypeTagGuard {
    tag: TypeTag,
    meta: GuardMeta,
}

impl TypeTagGuard {
    /// The category checked
    pub fn tag(&self) -> TypeTag {
        self.tag
    }
}

impl TypeGuard for TypeTagGuard {
    fn test(&self, value: &Value) -> bool {
        value.type_tag() == Some(self.tag)
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        self.tag.to_string()
    }

    fn project(&self, _projection: &mut Projection) -> SchemaNode {
        SchemaNode::Primitive(self.tag)
    }
}

/// Guard for the `typeof` category `tag`
pub fn type_of(tag: TypeTag) -> TypeTagGuard {
    TypeTagGuard {
        tag,
        meta: GuardMeta::new(),
    }
}

/// Numbers, including `NaN` and the infinities
pub fn is_number() -> TypeTagGuard {
    type_of(TypeTag::Number)
}

/// Strings
pub fn is_string() -> TypeTagGuard {
    type_of(TypeTag::String)
}

/// Booleans
pub fn is_boolean() -> TypeTagGuard {
    type_of(TypeTag::Boolean)
}

/// Big integers
pub fn is_bigint() -> TypeTagGuard {
    type_of(TypeTag::BigInt)
}

/// Symbols
pub fn is_symbol() -> TypeTagGuard {
    type_of(TypeTag::Symbol)
}

/// Functions
pub fn is_function() -> TypeTagGuard {
    type_of(TypeTag::Function)
}

/// Non-null objects: plain objects, instances, arrays, sets and maps
pub fn is_object() -> TypeTagGuard {
    type_of(TypeTag::Object)
}

/// The missing value
pub fn is_undefined() -> TypeTagGuard {
    type_of(TypeTag::Undefined)
}

/// Accepts everything
#[derive(Debug, Clone, Default)]
pub struct UnknownGuard {
    meta: GuardMeta,
}

impl TypeGuard for UnknownGuard {
    fn test(&self, _value: &Value) -> bool {
        true
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        "unknown".to_string()
    }

    fn project(&self, _projection: &mut Projection) -> SchemaNode {
        SchemaNode::Unknown
    }
}

/// The top guard
pub fn is_unknown() -> UnknownGuard {
    UnknownGuard::default()
}

/// Accepts a finite set of scalars
#[derive(Debug, Clone)]
pub struct LiteralGuard {
    values: Arc<[Literal]>,
    meta: GuardMeta,
}

impl LiteralGuard {
    fn from_values(values: Vec<Literal>) -> Self {
        let mut unique: Vec<Literal> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self {
            values: unique.into(),
            meta: GuardMeta::new(),
        }
    }

    /// Accepted values, in construction order
    pub fn values(&self) -> &[Literal] {
        &self.values
    }

    /// True if `literal` is one of the accepted values
    pub fn contains(&self, literal: &Literal) -> bool {
        self.values.contains(literal)
    }

    /// New literal guard over the values also found in `subset`, in this guard's order
    pub fn extract<I>(&self, subset: I) -> LiteralGuard
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        let subset: Vec<Literal> = subset.into_iter().map(Into::into).collect();
        Self::from_values(
            self.values
                .iter()
                .filter(|value| subset.contains(value))
                .cloned()
                .collect(),
        )
    }

    /// New literal guard over the values not found in `subset`
    pub fn exclude<I>(&self, subset: I) -> LiteralGuard
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        let subset: Vec<Literal> = subset.into_iter().map(Into::into).collect();
        Self::from_values(
            self.values
                .iter()
                .filter(|value| !subset.contains(value))
                .cloned()
                .collect(),
        )
    }
}

impl TypeGuard for LiteralGuard {
    fn test(&self, value: &Value) -> bool {
        self.values.iter().any(|literal| literal.matches(value))
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        if self.values.is_empty() {
            return "never".to_string();
        }
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn project(&self, _projection: &mut Projection) -> SchemaNode {
        SchemaNode::union(self.values.iter().map(SchemaNode::literal))
    }
}

/// Accepts exactly the given scalars; `literal([] as [Literal; 0])` accepts nothing
pub fn literal<I>(values: I) -> LiteralGuard
where
    I: IntoIterator,
    I::Item: Into<Literal>,
{
    LiteralGuard::from_values(values.into_iter().map(Into::into).collect())
}

/// Accepts only null
pub fn is_null() -> LiteralGuard {
    literal([Literal::Null])
}

/// Accepts objects whose prototype chain contains a class
#[derive(Debug, Clone)]
pub struct InstanceGuard {
    class: Class,
    meta: GuardMeta,
}

impl InstanceGuard {
    /// The class looked for
    pub fn class(&self) -> &Class {
        &self.class
    }
}

impl TypeGuard for InstanceGuard {
    fn test(&self, value: &Value) -> bool {
        match value.as_object().map(|object| object.prototype()) {
            Some(Prototype::Instance(class)) => class.inherits(&self.class),
            _ => false,
        }
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        self.class.name().to_string()
    }

    fn project(&self, _projection: &mut Projection) -> SchemaNode {
        SchemaNode::Instance {
            class: self.class.name().to_string(),
        }
    }
}

/// Instances of `class` or of any class extending it
pub fn instance_of(class: &Class) -> InstanceGuard {
    InstanceGuard {
        class: class.clone(),
        meta: GuardMeta::new(),
    }
}

/// Accepts the canonical values of an enumeration
#[derive(Clone)]
pub struct EnumGuard {
    entries: Arc<[(String, Literal)]>,
    literal: LiteralGuard,
}

impl EnumGuard {
    /// Canonical values, in declaration order
    pub fn values(&self) -> &[Literal] {
        self.literal.values()
    }

    /// Declared entries, before canonicalization
    pub fn entries(&self) -> &[(String, Literal)] {
        &self.entries
    }
}

impl fmt::Debug for EnumGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumGuard")
            .field("values", &self.values())
            .field("meta", self.literal.meta())
            .finish()
    }
}

impl TypeGuard for EnumGuard {
    fn test(&self, value: &Value) -> bool {
        self.literal.test(value)
    }

    fn meta(&self) -> &GuardMeta {
        self.literal.meta()
    }

    fn describe(&self) -> String {
        self.literal.describe()
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        self.literal.project(projection)
    }
}

/// Values of an enumeration with numeric reverse-mapping entries removed
///
/// An entry `(k, n)` with numeric `n` shadows the entry keyed by `n`'s string
/// form when that entry's value is the string `k`. Whatever survives is
/// deduplicated in declaration order.
pub fn canonical_enum_values(entries: &[(String, Literal)]) -> Vec<Literal> {
    let reverse_keys: Vec<String> = entries
        .iter()
        .filter(|(_, value)| value.is_number())
        .filter_map(|(key, value)| {
            let reverse_key = value.to_key_string();
            entries
                .iter()
                .any(|(candidate, candidate_value)| {
                    *candidate == reverse_key
                        && matches!(candidate_value, Literal::String(text) if text == key)
                })
                .then_some(reverse_key)
        })
        .collect();

    let mut values: Vec<Literal> = Vec::new();
    for (key, value) in entries {
        if reverse_keys.contains(key) || values.contains(value) {
            continue;
        }
        values.push(value.clone());
    }
    values
}

/// Guard over an enumeration given as ordered `(key, value)` entries
pub fn enumeration<I, K, V>(entries: I) -> EnumGuard
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Literal>,
{
    let entries: Vec<(String, Literal)> = entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect();
    let literal = literal(canonical_enum_values(&entries));
    EnumGuard {
        entries: entries.into(),
        literal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Function, Object, Symbol};
    use test_case::test_case;

    #[test_case(Value::from(1.5), TypeTag::Number; "number")]
    #[test_case(Value::Number(f64::NAN), TypeTag::Number; "nan is a number")]
    #[test_case(Value::from("x"), TypeTag::String; "string")]
    #[test_case(Value::from(false), TypeTag::Boolean; "boolean")]
    #[test_case(Value::BigInt(10), TypeTag::BigInt; "bigint")]
    #[test_case(Value::from(Symbol::new("s")), TypeTag::Symbol; "symbol")]
    #[test_case(Value::from(Function::new("f")), TypeTag::Function; "function")]
    #[test_case(Value::array([1, 2]), TypeTag::Object; "array is object")]
    #[test_case(Value::object([("a", 1)]), TypeTag::Object; "plain object")]
    #[test_case(Value::Undefined, TypeTag::Undefined; "undefined")]
    fn test_type_tag_accepts_own_category(value: Value, tag: TypeTag) {
        let guard = type_of(tag);
        assert_eq!(guard.tag(), tag);
        assert!(guard.test(&value));
    }

    #[test]
    fn test_null_is_not_an_object() {
        assert!(!is_object().test(&Value::Null));
        assert!(is_null().test(&Value::Null));
        assert!(!is_null().test(&Value::Undefined));
    }

    #[test]
    fn test_literal_dedups_keeping_first() {
        let guard = literal(["a", "b", "a"]);
        assert_eq!(guard.values(), &[Literal::from("a"), Literal::from("b")]);
        assert_eq!(guard.describe(), "\"a\" | \"b\"");
    }

    #[test]
    fn test_empty_literal_accepts_nothing() {
        let guard = literal(Vec::<Literal>::new());
        assert!(!guard.test(&Value::Undefined));
        assert_eq!(guard.describe(), "never");
    }

    #[test]
    fn test_literal_extract_and_exclude() {
        let guard = literal([1, 2, 3]);
        assert_eq!(
            guard.extract([3, 2, 4]).values(),
            &[Literal::from(2), Literal::from(3)]
        );
        assert_eq!(
            guard.exclude([2]).values(),
            &[Literal::from(1), Literal::from(3)]
        );
        assert_ne!(guard.extract([1]).id(), guard.id());
    }

    #[test]
    fn test_literal_is_strict() {
        let guard = literal([1]);
        assert!(!guard.test(&Value::from("1")));
        assert!(!guard.test(&Value::from(true)));
        assert!(guard.test(&Value::from(1.0)));
    }

    #[test]
    fn test_literal_nan_and_signed_zero() {
        let guard = literal([f64::NAN, 0.0]);
        assert!(guard.test(&Value::Number(f64::NAN)));
        assert!(guard.test(&Value::Number(-0.0)));
    }

    #[test]
    fn test_instance_of_walks_prototype_chain() {
        let animal = Class::new("Animal");
        let dog = Class::extends("Dog", &animal);
        let guard = instance_of(&animal);

        assert!(guard.test(&Value::from(Object::instance(&dog))));
        assert!(guard.test(&Value::from(Object::instance(&animal))));
        assert!(!guard.test(&Value::from(Object::instance(&Class::new("Animal")))));
        assert!(!guard.test(&Value::object([("name", "rex")])));
        assert!(!instance_of(&dog).test(&Value::from(Object::instance(&animal))));
        assert_eq!(guard.class(), &animal);
    }

    #[test]
    fn test_enum_strips_reverse_mapping() {
        let guard = enumeration([
            ("A", Literal::from(0)),
            ("B", Literal::from(1)),
            ("0", Literal::from("A")),
            ("1", Literal::from("B")),
            ("C", Literal::from("x")),
        ]);
        assert_eq!(
            guard.values(),
            &[Literal::from(0), Literal::from(1), Literal::from("x")]
        );
        assert!(guard.test(&Value::from(0)));
        assert!(guard.test(&Value::from("x")));
        assert!(!guard.test(&Value::from("A")));
        assert_eq!(guard.entries().len(), 5);
    }

    #[test]
    fn test_enum_keeps_unrelated_string_entries() {
        let values = canonical_enum_values(&[
            ("A".to_string(), Literal::from(0)),
            ("0".to_string(), Literal::from("Z")),
        ]);
        assert_eq!(values, vec![Literal::from(0), Literal::from("Z")]);
    }

    #[test]
    fn test_enum_reverse_entries_for_large_and_tiny_numbers() {
        let values = canonical_enum_values(&[
            ("Big".to_string(), Literal::Number(1e21)),
            ("1e+21".to_string(), Literal::from("Big")),
            ("Tiny".to_string(), Literal::Number(1e-7)),
            ("1e-7".to_string(), Literal::from("Tiny")),
        ]);
        assert_eq!(values, vec![Literal::Number(1e21), Literal::Number(1e-7)]);
    }

    #[test]
    fn test_unknown_accepts_everything() {
        let guard = is_unknown();
        assert!(guard.test(&Value::Undefined));
        assert!(guard.test(&Value::Null));
        assert!(guard.test(&Value::set([1])));
    }
}
