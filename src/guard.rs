// Copyright 2025 Cowboy AI, LLC.

//! The type guard abstraction
//!
//! Every combinator in this crate implements [`TypeGuard`]: a total, pure test
//! from an arbitrary [`Value`] to `bool`, plus a fixed set of derivations that
//! build new guards from existing ones. Sub-guards are stored as [`Guard`], a
//! cheap type-erased handle.
//!
//! # Identity
//!
//! Each guard is created with a [`GuardMeta`] holding a process-unique
//! [`GuardId`] and the memoized schema slot. Cloning a guard (or erasing it
//! into a [`Guard`]) shares the meta, so the clone is the *same* guard: same
//! id, same cached schema.
//!
//! # Derivation laws
//!
//! - `g.or(others)` ≡ `union([g, others..])`
//! - `g.and(others)` ≡ `intersection([g, others..])`
//! - `g.optional()` ≡ `union([literal([Undefined]), g])`
//! - `g.maybe()` ≡ `union([literal([Null]), g])`
//! - `g.refine(f)` accepts `x` iff `g(x) && f(x)`, and never calls `f` when
//!   `g(x)` is false

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::algebra::{self, IntersectionGuard, OptionGuard, RefineGuard, Refinement, UnionGuard};
use crate::errors::SchemaResult;
use crate::schema::{self, Projection, Schema, SchemaNode};
use crate::structural::{self, ArrayGuard, IndexRecordGuard, SetGuard};
use crate::value::Value;

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GuardId(u64);

impl GuardId {
    fn next() -> Self {
        GuardId(NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guard{}", self.0)
    }
}

struct MetaState {
    id: GuardId,
    schema: OnceLock<Arc<Schema>>,
}

/// Identity and schema cache shared by every clone of a guard
#[derive(Clone)]
pub struct GuardMeta(Arc<MetaState>);

impl GuardMeta {
    /// Fresh identity with an empty schema cache
    pub fn new() -> Self {
        Self(Arc::new(MetaState {
            id: GuardId::next(),
            schema: OnceLock::new(),
        }))
    }

    /// The guard's id
    pub fn id(&self) -> GuardId {
        self.0.id
    }

    /// Schema stored by an earlier successful projection
    pub fn cached_schema(&self) -> Option<Arc<Schema>> {
        self.0.schema.get().cloned()
    }

    /// Store `schema` unless another projection got there first; returns the stored one
    pub(crate) fn store_schema(&self, schema: Arc<Schema>) -> Arc<Schema> {
        self.0.schema.get_or_init(|| schema).clone()
    }
}

impl Default for GuardMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GuardMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardMeta")
            .field("id", &self.0.id)
            .field("schema_cached", &self.0.schema.get().is_some())
            .finish()
    }
}

/// A runtime type predicate
///
/// Implementations must be total and pure: `test` returns the same answer for
/// the same input every time, never panics, and has no side effects.
pub trait TypeGuard: fmt::Debug + Send + Sync + 'static {
    /// Decide whether `value` conforms
    fn test(&self, value: &Value) -> bool;

    /// Identity and schema cache
    fn meta(&self) -> &GuardMeta;

    /// Short human-readable rendering, e.g. `number | string`
    fn describe(&self) -> String;

    /// Translate this guard into a backend-neutral schema node
    ///
    /// Sub-guards must be projected through [`Projection::node_for`] so
    /// self-referential descriptions terminate.
    fn project(&self, projection: &mut Projection) -> SchemaNode;

    /// The guard's identity
    fn id(&self) -> GuardId {
        self.meta().id()
    }

    /// Key shared by guards that always project to the same schema even
    /// though each has its own id
    ///
    /// Guards that regenerate their target on every use return `Some`, so a
    /// [`Projection`] recognizes a regenerated copy as re-entry.
    fn projection_alias(&self) -> Option<TypeId> {
        None
    }

    /// Project into the external schema representation, memoized per guard
    ///
    /// The first successful call resolves the schema backend, renders, and
    /// caches; later calls return the same `Arc`. A failure caches nothing.
    fn schema(&self) -> SchemaResult<Arc<Schema>> {
        schema::project(self)
    }

    /// Erase into a shared handle, keeping identity
    fn boxed(&self) -> Guard
    where
        Self: Clone + Sized,
    {
        Guard(Arc::new(self.clone()))
    }

    /// This guard as a closure, for `Iterator::all`, `any`, `position`, ...
    fn predicate(&self) -> impl Fn(&Value) -> bool + '_
    where
        Self: Sized,
    {
        move |value: &Value| self.test(value)
    }

    /// Also accept the missing value
    fn optional(&self) -> OptionGuard
    where
        Self: Clone + Sized,
    {
        algebra::optional(self.boxed())
    }

    /// Also accept null
    fn maybe(&self) -> OptionGuard
    where
        Self: Clone + Sized,
    {
        algebra::maybe(self.boxed())
    }

    /// Intersection of this guard followed by `others`
    fn and<I>(&self, others: I) -> IntersectionGuard
    where
        Self: Clone + Sized,
        I: IntoIterator<Item = Guard>,
    {
        algebra::intersection(std::iter::once(self.boxed()).chain(others))
    }

    /// Union of this guard followed by `others`
    fn or<I>(&self, others: I) -> UnionGuard
    where
        Self: Clone + Sized,
        I: IntoIterator<Item = Guard>,
    {
        algebra::union(std::iter::once(self.boxed()).chain(others))
    }

    /// Arrays whose every element passes this guard
    fn array(&self) -> ArrayGuard
    where
        Self: Clone + Sized,
    {
        structural::array_of(self.boxed())
    }

    /// Sets whose every member passes this guard
    fn set(&self) -> SetGuard
    where
        Self: Clone + Sized,
    {
        structural::set_of(self.boxed())
    }

    /// Plain objects whose every own property value passes this guard
    fn index_record(&self) -> IndexRecordGuard
    where
        Self: Clone + Sized,
    {
        structural::index_record(self.boxed())
    }

    /// Narrow this guard with an extra check, evaluated only after this guard accepts
    fn refine<F>(&self, check: F) -> RefineGuard
    where
        Self: Clone + Sized,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        algebra::refine(self.boxed(), Refinement::new("refinement", check))
    }

    /// Like [`TypeGuard::refine`] with a label for descriptions and schemas
    fn refine_named<F>(&self, label: impl Into<String>, check: F) -> RefineGuard
    where
        Self: Clone + Sized,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        algebra::refine(self.boxed(), Refinement::new(label, check))
    }
}

/// Shared, type-erased handle to any guard
#[derive(Clone)]
pub struct Guard(Arc<dyn TypeGuard>);

impl Guard {
    /// Erase a concrete guard
    pub fn new<G: TypeGuard>(guard: G) -> Self {
        Guard(Arc::new(guard))
    }

    /// True if both handles refer to the same guard
    pub fn same_as<G: TypeGuard + ?Sized>(&self, other: &G) -> bool {
        self.id() == other.id()
    }
}

impl TypeGuard for Guard {
    fn test(&self, value: &Value) -> bool {
        self.0.test(value)
    }

    fn meta(&self) -> &GuardMeta {
        self.0.meta()
    }

    fn describe(&self) -> String {
        self.0.describe()
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        self.0.project(projection)
    }

    fn projection_alias(&self) -> Option<TypeId> {
        self.0.projection_alias()
    }

    fn boxed(&self) -> Guard {
        self.clone()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{is_number, is_string, literal};

    #[test]
    fn test_ids_are_unique() {
        let a = is_number();
        let b = is_number();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_boxing_preserves_identity() {
        let number = is_number();
        let boxed = number.boxed();
        assert_eq!(boxed.id(), number.id());
        assert!(boxed.same_as(&number));
        assert!(boxed.boxed().same_as(&boxed));
        assert!(!boxed.same_as(&is_number()));
    }

    #[test]
    fn test_predicate_plugs_into_iterators() {
        let values = vec![Value::from(1), Value::from("a"), Value::from(2)];
        let number = is_number();

        assert!(!values.iter().all(number.predicate()));
        assert!(values.iter().any(number.predicate()));
        assert_eq!(values.iter().position(is_string().predicate()), Some(1));

        let numbers: Vec<Value> = values.into_iter().filter(number.predicate()).collect();
        assert_eq!(numbers, vec![Value::from(1), Value::from(2)]);
    }

    #[test]
    fn test_or_and_keep_call_order() {
        let number = is_number();
        let string = is_string();
        let union = number.or([string.boxed()]);
        let members: Vec<GuardId> = union.members().iter().map(|m| m.id()).collect();
        assert_eq!(members, vec![number.id(), string.id()]);

        let both = number.and([literal([1, 2]).boxed()]);
        assert!(both.test(&Value::from(1)));
        assert!(!both.test(&Value::from(3)));
        assert_eq!(both.members()[0].id(), number.id());
    }

    #[test]
    fn test_optional_and_maybe_unbox_to_original() {
        let number = is_number();
        let optional = number.optional();
        let maybe = number.maybe();

        assert!(optional.unbox().same_as(&number));
        assert!(maybe.unbox().same_as(&number));
        assert!(optional.test(&Value::Undefined));
        assert!(!optional.test(&Value::Null));
        assert!(maybe.test(&Value::Null));
        assert!(!maybe.test(&Value::Undefined));
    }

    #[test]
    fn test_refine_short_circuits() {
        use std::sync::atomic::AtomicUsize;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let positive = is_number().refine(move |value| {
            counter.fetch_add(1, Ordering::SeqCst);
            matches!(value, Value::Number(n) if *n > 0.0)
        });

        assert!(!positive.test(&Value::from("5")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(positive.test(&Value::from(5)));
        assert!(!positive.test(&Value::from(-5)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_display_uses_description() {
        let guard = is_number().or([is_string().boxed()]).boxed();
        assert_eq!(guard.to_string(), "number | string");
    }
}
