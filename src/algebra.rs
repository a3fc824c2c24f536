// Copyright 2025 Cowboy AI, LLC.

//! Algebraic combinators: union, intersection, optional, refinement
//!
//! Union and intersection form two monoids over guards. `union([])` accepts
//! nothing and is the identity of `union`; `intersection([])` accepts
//! everything and is the identity of `intersection`. Members are evaluated in
//! order with short-circuiting, so a member's side effects (there should be
//! none) would be observable only up to the first decisive member.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::guard::{Guard, GuardMeta, TypeGuard};
use crate::literal::Literal;
use crate::primitives::literal;
use crate::schema::{Projection, SchemaNode};
use crate::value::Value;

/// Accepts a value if any member accepts it
#[derive(Debug, Clone)]
pub struct UnionGuard {
    members: Arc<[Guard]>,
    meta: GuardMeta,
}

impl UnionGuard {
    /// Members in evaluation order
    pub fn members(&self) -> &[Guard] {
        &self.members
    }
}

impl TypeGuard for UnionGuard {
    fn test(&self, value: &Value) -> bool {
        self.members.iter().any(|member| member.test(value))
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        join_descriptions(&self.members, " | ", "never")
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        SchemaNode::union(
            self.members
                .iter()
                .map(|member| projection.node_for(member))
                .collect::<Vec<_>>(),
        )
    }
}

/// Accepts a value if every member accepts it
#[derive(Debug, Clone)]
pub struct IntersectionGuard {
    members: Arc<[Guard]>,
    meta: GuardMeta,
}

impl IntersectionGuard {
    /// Members in evaluation order
    pub fn members(&self) -> &[Guard] {
        &self.members
    }
}

impl TypeGuard for IntersectionGuard {
    fn test(&self, value: &Value) -> bool {
        self.members.iter().all(|member| member.test(value))
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        join_descriptions(&self.members, " & ", "unknown")
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        SchemaNode::intersection(
            self.members
                .iter()
                .map(|member| projection.node_for(member))
                .collect::<Vec<_>>(),
        )
    }
}

/// Which sentinel an [`OptionGuard`] adds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// The missing value
    Undefined,
    /// The explicit null
    Null,
}

impl Sentinel {
    fn literal(self) -> Literal {
        match self {
            Sentinel::Undefined => Literal::Undefined,
            Sentinel::Null => Literal::Null,
        }
    }
}

/// A guard widened by one sentinel value
///
/// Behaves exactly like `union([literal([sentinel]), inner])` and keeps the
/// wrapped guard reachable through [`OptionGuard::unbox`].
#[derive(Debug, Clone)]
pub struct OptionGuard {
    sentinel: Sentinel,
    union: UnionGuard,
    inner: Guard,
}

impl OptionGuard {
    fn new(sentinel: Sentinel, inner: Guard) -> Self {
        let union = union([literal([sentinel.literal()]).boxed(), inner.clone()]);
        Self {
            sentinel,
            union,
            inner,
        }
    }

    /// The guard before widening
    pub fn unbox(&self) -> &Guard {
        &self.inner
    }

    /// The added sentinel
    pub fn sentinel(&self) -> Sentinel {
        self.sentinel
    }

    /// The equivalent union
    pub fn as_union(&self) -> &UnionGuard {
        &self.union
    }
}

impl TypeGuard for OptionGuard {
    fn test(&self, value: &Value) -> bool {
        self.union.test(value)
    }

    fn meta(&self) -> &GuardMeta {
        self.union.meta()
    }

    fn describe(&self) -> String {
        self.union.describe()
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        self.union.project(projection)
    }
}

static NEXT_REFINEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A labelled post-hoc check attached to a guard by [`refine`]
#[derive(Clone)]
pub struct Refinement {
    id: u64,
    label: Arc<str>,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Refinement {
    /// Wrap `check` under `label`
    pub fn new<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            id: NEXT_REFINEMENT_ID.fetch_add(1, Ordering::Relaxed),
            label: Arc::from(label.into()),
            check: Arc::new(check),
        }
    }

    /// Process-unique id, referenced from rendered schemas
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the check
    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A guard narrowed by a [`Refinement`]
#[derive(Debug, Clone)]
pub struct RefineGuard {
    base: Guard,
    refinement: Refinement,
    meta: GuardMeta,
}

impl RefineGuard {
    /// The guard checked first
    pub fn base(&self) -> &Guard {
        &self.base
    }

    /// The check run after the base accepts
    pub fn refinement(&self) -> &Refinement {
        &self.refinement
    }
}

impl TypeGuard for RefineGuard {
    fn test(&self, value: &Value) -> bool {
        self.base.test(value) && self.refinement.check(value)
    }

    fn meta(&self) -> &GuardMeta {
        &self.meta
    }

    fn describe(&self) -> String {
        format!("{} where {}", self.base.describe(), self.refinement.label())
    }

    fn project(&self, projection: &mut Projection) -> SchemaNode {
        projection.register_refinement(&self.refinement);
        let base = projection.node_for(&self.base);
        SchemaNode::Refine {
            base: Box::new(base),
            refinement: self.refinement.id(),
            label: self.refinement.label().to_string(),
        }
    }
}

/// Accepts what any member accepts; `union([])` accepts nothing
pub fn union<I>(members: I) -> UnionGuard
where
    I: IntoIterator<Item = Guard>,
{
    UnionGuard {
        members: members.into_iter().collect(),
        meta: GuardMeta::new(),
    }
}

/// Accepts what every member accepts; `intersection([])` accepts everything
pub fn intersection<I>(members: I) -> IntersectionGuard
where
    I: IntoIterator<Item = Guard>,
{
    IntersectionGuard {
        members: members.into_iter().collect(),
        meta: GuardMeta::new(),
    }
}

/// `guard` widened to accept the missing value
pub fn optional(guard: Guard) -> OptionGuard {
    OptionGuard::new(Sentinel::Undefined, guard)
}

/// `guard` widened to accept null
pub fn maybe(guard: Guard) -> OptionGuard {
    OptionGuard::new(Sentinel::Null, guard)
}

/// `guard` narrowed by `refinement`
pub fn refine(guard: Guard, refinement: Refinement) -> RefineGuard {
    RefineGuard {
        base: guard,
        refinement,
        meta: GuardMeta::new(),
    }
}

fn join_descriptions(members: &[Guard], separator: &str, empty: &str) -> String {
    if members.is_empty() {
        return empty.to_string();
    }
    members
        .iter()
        .map(|member| member.describe())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{is_number, is_string, is_unknown};
    use test_case::test_case;

    #[test]
    fn test_empty_union_accepts_nothing() {
        let never = union([]);
        assert!(!never.test(&Value::Undefined));
        assert!(!never.test(&Value::from(1)));
        assert_eq!(never.describe(), "never");
    }

    #[test]
    fn test_empty_intersection_accepts_everything() {
        let unknown = intersection([]);
        assert!(unknown.test(&Value::Undefined));
        assert!(unknown.test(&Value::Null));
        assert!(unknown.test(&Value::from("x")));
        assert_eq!(unknown.describe(), "unknown");
    }

    #[test_case(Value::from(1), true; "number")]
    #[test_case(Value::from("a"), true; "string")]
    #[test_case(Value::from(true), false; "boolean")]
    #[test_case(Value::Null, false; "null")]
    fn test_union_membership(value: Value, expected: bool) {
        let guard = union([is_number().boxed(), is_string().boxed()]);
        assert_eq!(guard.test(&value), expected);
    }

    #[test]
    fn test_intersection_with_unknown_is_identity() {
        let number = is_number();
        let guard = intersection([is_unknown().boxed(), number.boxed()]);
        assert!(guard.test(&Value::from(1)));
        assert!(!guard.test(&Value::from("1")));
    }

    #[test]
    fn test_optional_matches_union_with_undefined() {
        let optional = optional(is_string().boxed());
        assert_eq!(optional.sentinel(), Sentinel::Undefined);
        assert_eq!(optional.as_union().members().len(), 2);
        assert!(optional.test(&Value::Undefined));
        assert!(optional.test(&Value::from("s")));
        assert!(!optional.test(&Value::Null));
        assert_eq!(optional.describe(), "undefined | string");
    }

    #[test]
    fn test_maybe_describes_null() {
        let maybe = maybe(is_number().boxed());
        assert_eq!(maybe.sentinel(), Sentinel::Null);
        assert_eq!(maybe.describe(), "null | number");
    }

    #[test]
    fn test_refine_describes_label() {
        let positive = refine(
            is_number().boxed(),
            Refinement::new("positive", |value| matches!(value, Value::Number(n) if *n > 0.0)),
        );
        assert_eq!(positive.describe(), "number where positive");
        assert_eq!(positive.refinement().label(), "positive");
        assert!(positive.base().test(&Value::from(-1)));
        assert!(!positive.test(&Value::from(-1)));
    }

    #[test]
    fn test_refinement_ids_are_unique() {
        let a = Refinement::new("a", |_| true);
        let b = Refinement::new("a", |_| true);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
