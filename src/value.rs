// Copyright 2025 Cowboy AI, LLC.

//! Dynamic values checked by type guards
//!
//! A [`Value`] is data of unknown shape as it arrives from a trust boundary:
//! deserialized documents, reflected objects, foreign API payloads. Guards
//! never trust its structure; they inspect it and answer yes or no.
//!
//! The model distinguishes the two "nothing" sentinels (`Undefined` for a
//! missing value, `Null` for an explicit null), carries identity-bearing
//! symbols, functions and classes, and gives every object a [`Prototype`] so
//! plain objects can be told apart from class instances.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Category reported by a `typeof`-style inspection of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Any IEEE-754 number, `NaN` and infinities included
    Number,
    /// Text
    String,
    /// `true` or `false`
    Boolean,
    /// Integer outside the number domain
    BigInt,
    /// Unique identity-compared token
    Symbol,
    /// Callable value
    Function,
    /// Non-null object: plain objects, instances, arrays, sets and maps
    Object,
    /// The missing-value sentinel
    Undefined,
}

impl TypeTag {
    /// Name of the category as a `typeof` expression would print it
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Boolean => "boolean",
            TypeTag::BigInt => "bigint",
            TypeTag::Symbol => "symbol",
            TypeTag::Function => "function",
            TypeTag::Object => "object",
            TypeTag::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct SymbolData {
    description: Option<String>,
}

/// A unique token; two symbols are equal only if they are the same symbol
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    /// Create a fresh symbol with a description
    pub fn new(description: impl Into<String>) -> Self {
        Self(Arc::new(SymbolData {
            description: Some(description.into()),
        }))
    }

    /// Create a fresh symbol without a description
    pub fn anonymous() -> Self {
        Self(Arc::new(SymbolData { description: None }))
    }

    /// The description given at creation
    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

#[derive(Debug)]
struct FunctionData {
    name: String,
}

/// Opaque callable marker; compared by identity
#[derive(Clone)]
pub struct Function(Arc<FunctionData>);

impl Function {
    /// Create a new function value
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(FunctionData { name: name.into() }))
    }

    /// Declared name of the function
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name())
    }
}

#[derive(Debug)]
struct ClassData {
    name: String,
    parent: Option<Class>,
}

/// Nominal type with an optional parent; the parent links form the prototype chain
#[derive(Clone)]
pub struct Class(Arc<ClassData>);

impl Class {
    /// Declare a root class
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassData {
            name: name.into(),
            parent: None,
        }))
    }

    /// Declare a class deriving from `parent`
    pub fn extends(name: impl Into<String>, parent: &Class) -> Self {
        Self(Arc::new(ClassData {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Direct parent class
    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// Walk the chain starting at `self`, parents last
    pub fn chain(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| (*class).parent())
    }

    /// True if `ancestor` is `self` or appears among its parents
    pub fn inherits(&self, ancestor: &Class) -> bool {
        self.chain().any(|class| class == ancestor)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[class {}]", self.name())
    }
}

/// Property key: a string or a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Ordinary string key
    String(Arc<str>),
    /// Symbol key
    Symbol(Symbol),
}

impl PropertyKey {
    /// The string form of the key, if it is a string key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(key) => Some(key),
            PropertyKey::Symbol(_) => None,
        }
    }

    fn array_index(&self) -> Option<usize> {
        let key = self.as_str()?;
        let index = key.parse::<usize>().ok()?;
        // "01" or "+1" are not array indices
        (index.to_string() == key).then_some(index)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(key) => f.write_str(key),
            PropertyKey::Symbol(symbol) => write!(f, "[{symbol:?}]"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(key: &str) -> Self {
        PropertyKey::String(Arc::from(key))
    }
}

impl From<String> for PropertyKey {
    fn from(key: String) -> Self {
        PropertyKey::String(Arc::from(key))
    }
}

impl From<&String> for PropertyKey {
    fn from(key: &String) -> Self {
        PropertyKey::String(Arc::from(key.as_str()))
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

impl From<&Symbol> for PropertyKey {
    fn from(symbol: &Symbol) -> Self {
        PropertyKey::Symbol(symbol.clone())
    }
}

/// Prototype of an object
#[derive(Debug, Clone, PartialEq)]
pub enum Prototype {
    /// The plain-object prototype (`{}` literals, deserialized documents)
    Plain,
    /// No prototype at all
    Null,
    /// Instance of a class
    Instance(Class),
}

/// Keyed object with a prototype and ordered own properties
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    prototype: Prototype,
    properties: IndexMap<PropertyKey, Value>,
}

impl Object {
    /// Empty object with the given prototype
    pub fn new(prototype: Prototype) -> Self {
        Self {
            prototype,
            properties: IndexMap::new(),
        }
    }

    /// Empty plain object
    pub fn plain() -> Self {
        Self::new(Prototype::Plain)
    }

    /// Empty instance of `class`
    pub fn instance(class: &Class) -> Self {
        Self::new(Prototype::Instance(class.clone()))
    }

    /// Builder-style property insertion
    pub fn with(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an own property
    pub fn insert(&mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Own property lookup
    pub fn get(&self, key: &PropertyKey) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Own properties in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&PropertyKey, &Value)> {
        self.properties.iter()
    }

    /// The object's prototype
    pub fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    /// True for objects whose prototype is the plain-object prototype
    pub fn is_plain(&self) -> bool {
        self.prototype == Prototype::Plain
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if the object has no own properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A value of unknown shape
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Missing value
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Big integer
    BigInt(i128),
    /// String
    String(Arc<str>),
    /// Symbol
    Symbol(Symbol),
    /// Function
    Function(Function),
    /// Ordered list
    Array(Vec<Value>),
    /// Set of values in insertion order
    Set(Vec<Value>),
    /// Key/value collection with arbitrary keys
    Map(Vec<(Value, Value)>),
    /// Keyed object
    Object(Object),
}

impl Value {
    /// String value
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::String(Arc::from(text.as_ref()))
    }

    /// Array value
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Set value
    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Map value
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Plain object value
    pub fn object<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        let mut object = Object::plain();
        for (key, value) in properties {
            object.insert(key, value);
        }
        Value::Object(object)
    }

    /// The `typeof` category; `None` for `Null`
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Undefined => Some(TypeTag::Undefined),
            Value::Null => None,
            Value::Bool(_) => Some(TypeTag::Boolean),
            Value::Number(_) => Some(TypeTag::Number),
            Value::BigInt(_) => Some(TypeTag::BigInt),
            Value::String(_) => Some(TypeTag::String),
            Value::Symbol(_) => Some(TypeTag::Symbol),
            Value::Function(_) => Some(TypeTag::Function),
            Value::Array(_) | Value::Set(_) | Value::Map(_) | Value::Object(_) => {
                Some(TypeTag::Object)
            }
        }
    }

    /// True for `Undefined` and `Null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Property access; anything that is not there reads as `Undefined`
    ///
    /// Objects expose their own properties. Arrays and strings expose indices
    /// and `length`.
    pub fn get(&self, key: &PropertyKey) -> Cow<'_, Value> {
        match self {
            Value::Object(object) => object
                .get(key)
                .map(Cow::Borrowed)
                .unwrap_or(Cow::Owned(Value::Undefined)),
            Value::Array(items) => {
                if key.as_str() == Some("length") {
                    return Cow::Owned(Value::Number(items.len() as f64));
                }
                key.array_index()
                    .and_then(|index| items.get(index))
                    .map(Cow::Borrowed)
                    .unwrap_or(Cow::Owned(Value::Undefined))
            }
            // Strings index and count UTF-16 code units
            Value::String(text) => {
                if key.as_str() == Some("length") {
                    return Cow::Owned(Value::Number(text.encode_utf16().count() as f64));
                }
                let unit = key
                    .array_index()
                    .and_then(|index| text.encode_utf16().nth(index));
                match unit {
                    Some(unit) => Cow::Owned(Value::from(String::from_utf16_lossy(&[unit]))),
                    None => Cow::Owned(Value::Undefined),
                }
            }
            _ => Cow::Owned(Value::Undefined),
        }
    }

    /// Object view, if this is an object
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Element view, if this is an array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl AsRef<Value> for Value {
    fn as_ref(&self) -> &Value {
        self
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Symbol> for Value {
    fn from(symbol: Symbol) -> Self {
        Value::Symbol(symbol)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => {
                Value::Number(number.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(text) => Value::from(text),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::object(map),
        }
    }
}
