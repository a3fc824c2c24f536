// Copyright 2025 Cowboy AI, LLC.

//! Deferred resolution for self-referential descriptions
//!
//! Combinator graphs are built eagerly, so a description that mentions itself
//! needs an indirection that is filled in after construction. Three forms:
//!
//! - [`Deferred`]: a cell holding either a generator or the value it produced,
//!   resolved at most once. Object templates use it.
//! - [`lazy`]: re-runs its generator on every call, caching nothing.
//! - [`recursive`]: hands a wrapper to the generator, then binds the realized
//!   guard into the wrapper's cell before returning.
//!
//! None of them detects cyclic *data*; a cyclic value recurses until the
//! stack runs out.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::{debug, trace};

use crate::guard::{Guard, GuardMeta, TypeGuard};
use crate::schema::{Projection, SchemaNode};
use crate::value::Value;

type Generator<T, A> = Box<dyn FnOnce(A) -> T + Send>;

/// A value produced on first use by a one-shot generator
///
/// The generator receives an argument of type `A` (the object guard under
/// construction, for templates). It must not force the same cell while it
/// runs.
pub struct Deferred<T, A = ()> {
    value: OnceLock<Option<T>>,
    generator: Mutex<Option<Generator<T, A>>>,
}

impl<T, A> Deferred<T, A> {
    /// Cell resolved by `generator` on first use
    pub fn new<F>(generator: F) -> Self
    where
        F: FnOnce(A) -> T + Send + 'static,
    {
        Self {
            value: OnceLock::new(),
            generator: Mutex::new(Some(Box::new(generator))),
        }
    }

    /// Cell that is already resolved
    pub fn resolved(value: T) -> Self {
        Self {
            value: OnceLock::from(Some(value)),
            generator: Mutex::new(None),
        }
    }

    /// The value, if already resolved
    pub fn peek(&self) -> Option<&T> {
        self.value.get().and_then(Option::as_ref)
    }

    /// True once the generator has run
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }

    /// Resolve with the argument produced by `argument`, or return the cached value
    ///
    /// Returns `None` only if an earlier generator run panicked.
    pub fn force_with(&self, argument: impl FnOnce() -> A) -> Option<&T> {
        self.value
            .get_or_init(|| {
                let generator = self
                    .generator
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                trace!(
                    pending = generator.is_some(),
                    value = std::any::type_name::<T>(),
                    "Resolving deferred value"
                );
                generator.map(|generate| generate(argument()))
            })
            .as_ref()
    }
}

impl<T> Deferred<T, ()> {
    /// Resolve or return the cached value
    pub fn force(&self) -> Option<&T> {
        self.force_with(|| ())
    }
}

impl<T: fmt::Debug, A> fmt::Debug for Deferred<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(Some(value)) => f.debug_tuple("Deferred").field(value).finish(),
            Some(None) => f.write_str("Deferred(<failed>)"),
            None => f.write_str("Deferred(<pending>)"),
        }
    }
}

/// Defers to a freshly generated guard on every call
#[derive(Clone)]
pub struct LazyGuard {
    generator: Arc<dyn Fn() -> Guard + Send + Sync>,
    alias: Option<TypeId>,
    meta: GuardMeta,
}

impl LazyGuard {
    /// Run the generator and return what it produced
    pub fn unbox(&self) -> Guard {
        (self.generator)()
    }
}

impl fmt::Debug for LazyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyGuard")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl TypeGuard for LazyGuard {
    fn test(&self, value: &Value) -> bool {
        self.unbox().test(value)
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        "lazy".to_string()
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        projection.node_for(&self.unbox())
    }

    fn projection_alias(&self) -> Option<TypeId> {
        self.alias
    }
}

/// Guard that generates its target on every use
///
/// Nothing is cached: each `test` and each `unbox` calls `generator`. The
/// generator either captures a `Guard` that is only reachable later, or is a
/// plain function that builds the description afresh.
///
/// Generators that capture nothing (functions and non-capturing closures)
/// produce the same description on every call, so all lazy guards built from
/// one of them project as a single schema definition. That is what keeps
/// the schema of a regenerating recursive description finite:
///
/// ```
/// use cim_typeguard::prelude::*;
///
/// fn node() -> Guard {
///     object([
///         ("value", is_number().boxed()),
///         ("next", lazy(node).maybe().boxed()),
///     ])
///     .boxed()
/// }
///
/// let list = Value::object([
///     ("value", Value::from(1)),
///     ("next", Value::object([("value", Value::from(2)), ("next", Value::Null)])),
/// ]);
/// assert!(node().test(&list));
/// # #[cfg(feature = "json-schema")]
/// assert!(node().schema().is_ok());
/// ```
pub fn lazy<F>(generator: F) -> LazyGuard
where
    F: Fn() -> Guard + Send + Sync + 'static,
{
    let alias = (std::mem::size_of::<F>() == 0).then(TypeId::of::<F>);
    LazyGuard {
        generator: Arc::new(generator),
        alias,
        meta: GuardMeta::new(),
    }
}

/// A guard bound to its own realization
#[derive(Clone)]
pub struct RecursiveGuard {
    cell: Arc<OnceLock<Guard>>,
    meta: GuardMeta,
}

impl RecursiveGuard {
    /// The realized guard; `None` while the generator is still running
    pub fn unbox(&self) -> Option<&Guard> {
        self.cell.get()
    }
}

impl fmt::Debug for RecursiveGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveGuard")
            .field("meta", &self.meta)
            .field("bound", &self.cell.get().is_some())
            .finish()
    }
}

impl TypeGuard for RecursiveGuard {
    fn test(&self, value: &Value) -> bool {
        self.cell.get().is_some_and(|realized| realized.test(value))
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        "recursive".to_string()
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        match self.cell.get() {
            Some(realized) => projection.node_for(realized),
            None => SchemaNode::Never,
        }
    }
}

/// Build a guard that refers to itself
///
/// `generator` receives a handle to the guard being built and returns its
/// realization, which may embed the handle anywhere. The handle rejects
/// everything until the generator returns.
///
/// ```
/// use cim_typeguard::prelude::*;
///
/// let list = recursive(|this| {
///     object([
///         ("head", is_number().boxed()),
///         ("tail", maybe(this).boxed()),
///     ])
/// });
///
/// let value = Value::object([
///     ("head", Value::from(1)),
///     ("tail", Value::object([("head", Value::from(2)), ("tail", Value::Null)])),
/// ]);
/// assert!(list.test(&value));
/// ```
pub fn recursive<F, G>(generator: F) -> RecursiveGuard
where
    F: FnOnce(Guard) -> G,
    G: TypeGuard + Clone,
{
    let wrapper = RecursiveGuard {
        cell: Arc::new(OnceLock::new()),
        meta: GuardMeta::new(),
    };
    let realized = generator(wrapper.boxed()).boxed();
    debug!(
        guard = %wrapper.id(),
        realized = %realized.id(),
        "Bound recursive type guard"
    );
    let _ = wrapper.cell.set(realized);
    wrapper
}
