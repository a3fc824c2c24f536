// Copyright 2025 Cowboy AI, LLC.

//! Structural guards: objects, records, tuples and collections
//!
//! Object guards are open-world: every declared key must validate, undeclared
//! keys are ignored. Records additionally insist on the plain-object
//! prototype, which rules out arrays, class instances and `null`-prototype
//! objects.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::deferred::Deferred;
use crate::guard::{Guard, GuardMeta, TypeGuard};
use crate::schema::{Projection, SchemaNode};
use crate::value::{Object, PropertyKey, Value};

static UNDEFINED: Value = Value::Undefined;

/// Keyed template: property key → guard, in declaration order
pub type Template = IndexMap<PropertyKey, Guard>;

fn empty_template() -> &'static Template {
    static EMPTY: OnceLock<Template> = OnceLock::new();
    EMPTY.get_or_init(Template::new)
}

fn collect_template<I, K>(entries: I) -> Template
where
    I: IntoIterator<Item = (K, Guard)>,
    K: Into<PropertyKey>,
{
    entries
        .into_iter()
        .map(|(key, guard)| (key.into(), guard))
        .collect()
}

struct ObjectState {
    template: Deferred<Template, ObjectGuard>,
    plain_only: bool,
}

/// Accepts non-nullish values whose declared properties all validate
#[derive(Clone)]
pub struct ObjectGuard {
    state: Arc<ObjectState>,
    meta: GuardMeta,
}

impl ObjectGuard {
    fn with_template(template: Template, plain_only: bool) -> Self {
        Self {
            state: Arc::new(ObjectState {
                template: Deferred::resolved(template),
                plain_only,
            }),
            meta: GuardMeta::new(),
        }
    }

    fn resolved_template(&self) -> Option<&Template> {
        self.state.template.force_with(|| self.clone())
    }

    /// The template, resolving a generator on first use
    pub fn template(&self) -> &Template {
        self.resolved_template().unwrap_or_else(|| empty_template())
    }

    /// Declared keys in template order
    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.template().keys()
    }

    /// True if only plain objects qualify
    pub fn plain_only(&self) -> bool {
        self.state.plain_only
    }

    /// Same guard with every declared property made optional
    pub fn partial(&self) -> ObjectGuard {
        let template = self
            .template()
            .iter()
            .map(|(key, guard)| (key.clone(), guard.optional().boxed()))
            .collect();
        Self::with_template(template, self.plain_only())
    }

    /// Sub-template with only `keys`, in the order given; repeats collapse and
    /// undeclared keys are ignored
    pub fn pick<I, K>(&self, keys: I) -> ObjectGuard
    where
        I: IntoIterator<Item = K>,
        K: Into<PropertyKey>,
    {
        let source = self.template();
        let mut template = Template::new();
        for key in keys {
            let key = key.into();
            if template.contains_key(&key) {
                continue;
            }
            if let Some(guard) = source.get(&key) {
                template.insert(key, guard.clone());
            }
        }
        Self::with_template(template, self.plain_only())
    }

    /// Sub-template without `keys`
    pub fn omit<I, K>(&self, keys: I) -> ObjectGuard
    where
        I: IntoIterator<Item = K>,
        K: Into<PropertyKey>,
    {
        let removed: Vec<PropertyKey> = keys.into_iter().map(Into::into).collect();
        let template = self
            .template()
            .iter()
            .filter(|(key, _)| !removed.contains(key))
            .map(|(key, guard)| (key.clone(), guard.clone()))
            .collect();
        Self::with_template(template, self.plain_only())
    }
}

impl fmt::Debug for ObjectGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: templates may refer back to this guard
        let keys: Option<Vec<&PropertyKey>> =
            self.state.template.peek().map(|template| template.keys().collect());
        f.debug_struct("ObjectGuard")
            .field("keys", &keys)
            .field("plain_only", &self.state.plain_only)
            .field("meta", &self.meta)
            .finish()
    }
}

impl TypeGuard for ObjectGuard {
    fn test(&self, value: &Value) -> bool {
        if value.is_nullish() {
            return false;
        }
        if self.state.plain_only && !value.as_object().is_some_and(Object::is_plain) {
            return false;
        }
        match self.resolved_template() {
            Some(template) => template
                .iter()
                .all(|(key, guard)| guard.test(&value.get(key))),
            None => false,
        }
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        let keys: Vec<String> = self.keys().map(ToString::to_string).collect();
        if keys.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", keys.join(", "))
        }
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        let properties = self
            .template()
            .iter()
            .map(|(key, guard)| (key.clone(), projection.node_for(guard)))
            .collect();
        SchemaNode::Object {
            properties,
            plain_only: self.plain_only(),
        }
    }
}

/// Object guard over a fixed template
pub fn object<I, K>(template: I) -> ObjectGuard
where
    I: IntoIterator<Item = (K, Guard)>,
    K: Into<PropertyKey>,
{
    ObjectGuard::with_template(collect_template(template), false)
}

/// Object guard whose template is produced from the guard itself
///
/// `generator` runs once, on first use of the guard, and receives the guard
/// being built so the template can refer to it.
///
/// The generator may only store `this`. Calling `this.template()`, `test`,
/// `pick`, `omit`, `partial` or `schema` from inside the generator re-enters
/// the pending initialization and deadlocks.
///
/// ```
/// use cim_typeguard::prelude::*;
///
/// let tree = object_with(|this| {
///     [
///         ("value", is_number().boxed()),
///         ("left", this.maybe().boxed()),
///         ("right", this.maybe().boxed()),
///     ]
/// });
///
/// let leaf = Value::object([("value", 6.into()), ("left", Value::Null), ("right", Value::Null)]);
/// assert!(tree.test(&leaf));
/// ```
pub fn object_with<F, I, K>(generator: F) -> ObjectGuard
where
    F: FnOnce(ObjectGuard) -> I + Send + 'static,
    I: IntoIterator<Item = (K, Guard)>,
    K: Into<PropertyKey>,
{
    ObjectGuard {
        state: Arc::new(ObjectState {
            template: Deferred::new(move |this: ObjectGuard| collect_template(generator(this))),
            plain_only: false,
        }),
        meta: GuardMeta::new(),
    }
}

/// Plain objects whose every listed key holds a value accepted by `value`
pub fn record<I, K>(keys: I, value: Guard) -> ObjectGuard
where
    I: IntoIterator<Item = K>,
    K: Into<PropertyKey>,
{
    let template = keys
        .into_iter()
        .map(|key| (key.into(), value.clone()))
        .collect();
    ObjectGuard::with_template(template, true)
}

/// Plain objects whose every own property value passes a guard
#[derive(Debug, Clone)]
pub struct IndexRecordGuard {
    value: Guard,
    meta: GuardMeta,
}

impl IndexRecordGuard {
    /// Guard applied to every property value
    pub fn value(&self) -> &Guard {
        &self.value
    }
}

impl TypeGuard for IndexRecordGuard {
    fn test(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|object| {
            object.is_plain() && object.properties().all(|(_, item)| self.value.test(item))
        })
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        format!("Record<string, {}>", self.value.describe())
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        SchemaNode::IndexRecord(Box::new(projection.node_for(&self.value)))
    }
}

/// Plain objects with arbitrary keys and values accepted by `value`
pub fn index_record(value: Guard) -> IndexRecordGuard {
    IndexRecordGuard {
        value,
        meta: GuardMeta::new(),
    }
}

/// Positional guard over arrays
///
/// An array passes if it is no longer than the template and every template
/// guard accepts the element at its position, reading `Undefined` past the
/// end. Trailing optional elements may therefore be left out.
#[derive(Debug, Clone)]
pub struct TupleGuard {
    elements: Arc<[Guard]>,
    meta: GuardMeta,
}

impl TupleGuard {
    /// Element guards in position order
    pub fn elements(&self) -> &[Guard] {
        &self.elements
    }
}

impl TypeGuard for TupleGuard {
    fn test(&self, value: &Value) -> bool {
        let Some(items) = value.as_array() else {
            return false;
        };
        items.len() <= self.elements.len()
            && self
                .elements
                .iter()
                .enumerate()
                .all(|(index, element)| element.test(items.get(index).unwrap_or(&UNDEFINED)))
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        let elements: Vec<String> = self.elements.iter().map(|e| e.describe()).collect();
        format!("[{}]", elements.join(", "))
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        SchemaNode::Tuple(
            self.elements
                .iter()
                .map(|element| projection.node_for(element))
                .collect(),
        )
    }
}

/// Arrays matching `elements` position by position
pub fn tuple<I>(elements: I) -> TupleGuard
where
    I: IntoIterator<Item = Guard>,
{
    TupleGuard {
        elements: elements.into_iter().collect(),
        meta: GuardMeta::new(),
    }
}

/// Arrays whose every element passes a guard
#[derive(Debug, Clone)]
pub struct ArrayGuard {
    element: Guard,
    meta: GuardMeta,
}

impl ArrayGuard {
    /// Element guard
    pub fn element(&self) -> &Guard {
        &self.element
    }
}

impl TypeGuard for ArrayGuard {
    fn test(&self, value: &Value) -> bool {
        value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| self.element.test(item)))
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        format!("Array<{}>", self.element.describe())
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        SchemaNode::Array(Box::new(projection.node_for(&self.element)))
    }
}

/// Arrays of `element`
pub fn array_of(element: Guard) -> ArrayGuard {
    ArrayGuard {
        element,
        meta: GuardMeta::new(),
    }
}

/// Sets whose every member passes a guard
#[derive(Debug, Clone)]
pub struct SetGuard {
    element: Guard,
    meta: GuardMeta,
}

impl SetGuard {
    /// Member guard
    pub fn element(&self) -> &Guard {
        &self.element
    }
}

impl TypeGuard for SetGuard {
    fn test(&self, value: &Value) -> bool {
        match value {
            Value::Set(members) => members.iter().all(|member| self.element.test(member)),
            _ => false,
        }
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        format!("Set<{}>", self.element.describe())
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        SchemaNode::Set(Box::new(projection.node_for(&self.element)))
    }
}

/// Sets of `element`
pub fn set_of(element: Guard) -> SetGuard {
    SetGuard {
        element,
        meta: GuardMeta::new(),
    }
}

/// Maps whose every entry passes a key guard and a value guard
#[derive(Debug, Clone)]
pub struct MapGuard {
    key: Guard,
    value: Guard,
    meta: GuardMeta,
}

impl MapGuard {
    /// Key guard
    pub fn key(&self) -> &Guard {
        &self.key
    }

    /// Value guard
    pub fn value(&self) -> &Guard {
        &self.value
    }
}

impl TypeGuard for MapGuard {
    fn test(&self, value: &Value) -> bool {
        match value {
            Value::Map(entries) => entries
                .iter()
                .all(|(key, item)| self.key.test(key) && self.value.test(item)),
            _ => false,
        }
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        format!("Map<{}, {}>", self.key.describe(), self.value.describe())
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        let key = projection.node_for(&self.key);
        let value = projection.node_for(&self.value);
        SchemaNode::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// Maps from `key` to `value`
pub fn map_of(key: Guard, value: Guard) -> MapGuard {
    MapGuard {
        key,
        value,
        meta: GuardMeta::new(),
    }
}
