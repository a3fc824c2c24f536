// Copyright 2025 Cowboy AI, LLC.

//! # CIM Typeguard
//!
//! Composable runtime type guards for values crossing a trust boundary.
//!
//! A guard is a pure predicate over a dynamic [`Value`]. Guards compose:
//! - **Primitives**: type tags, literal sets, prototype chains, enums
//! - **Structure**: objects with open-world templates, records, index records,
//!   tuples, arrays, sets, maps
//! - **Algebra**: union, intersection, optional/maybe, refinement
//! - **Deferred resolution**: lazy, recursive, and self-referential object
//!   templates for descriptions that mention themselves
//!
//! Any guard can also be projected into a declarative schema on demand. The
//! projection is memoized per guard; the default backend renders JSON Schema
//! through `schemars` and is resolved only when first needed.
//!
//! ```
//! use cim_typeguard::prelude::*;
//!
//! let user = object([
//!     ("id", is_string().boxed()),
//!     ("age", is_number().optional().boxed()),
//!     ("role", literal(["admin", "member"]).boxed()),
//! ]);
//!
//! let input = Value::from(serde_json::json!({ "id": "u1", "role": "admin" }));
//! assert!(user.test(&input));
//! assert!(!user.test(&Value::from(serde_json::json!({ "id": "u1", "role": "root" }))));
//! ```
//!
//! ## Design Principles
//!
//! 1. **Total**: a guard answers `true` or `false` for every input and never panics
//! 2. **Identity**: clones share identity and the schema cache
//! 3. **Lazy collaborators**: a missing schema backend is a reportable error of
//!    `schema()`, never a load-time failure

#![warn(missing_docs)]

pub mod algebra;
pub mod deferred;
mod errors;
mod guard;
mod literal;
pub mod primitives;
pub mod schema;
pub mod structural;
mod value;

pub use algebra::{
    intersection, maybe, optional, refine, union, IntersectionGuard, OptionGuard, RefineGuard,
    Refinement, Sentinel, UnionGuard,
};
pub use deferred::{lazy, recursive, Deferred, LazyGuard, RecursiveGuard};
pub use errors::{SchemaError, SchemaResult};
pub use guard::{Guard, GuardId, GuardMeta, TypeGuard};
pub use literal::Literal;
pub use primitives::{
    canonical_enum_values, enumeration, instance_of, is_bigint, is_boolean, is_function,
    is_null, is_number, is_object, is_string, is_symbol, is_undefined, is_unknown, literal,
    type_of, EnumGuard, InstanceGuard, LiteralGuard, TypeTagGuard, UnknownGuard,
};
pub use schema::{Projection, Schema, SchemaBackend, SchemaNode};
#[cfg(feature = "json-schema")]
pub use schema::{JsonSchemaBackend, JsonSchemaConfig};
pub use structural::{
    array_of, index_record, map_of, object, object_with, record, set_of, tuple, ArrayGuard,
    IndexRecordGuard, MapGuard, ObjectGuard, SetGuard, Template, TupleGuard,
};
pub use value::{Class, Function, Object, PropertyKey, Prototype, Symbol, TypeTag, Value};

/// Everything needed to build and run guards
pub mod prelude {
    pub use crate::algebra::{intersection, maybe, optional, union};
    pub use crate::deferred::{lazy, recursive};
    pub use crate::guard::{Guard, TypeGuard};
    pub use crate::literal::Literal;
    pub use crate::primitives::{
        enumeration, instance_of, is_bigint, is_boolean, is_function, is_null, is_number,
        is_object, is_string, is_symbol, is_undefined, is_unknown, literal, type_of,
    };
    pub use crate::structural::{
        array_of, index_record, map_of, object, object_with, record, set_of, tuple,
    };
    pub use crate::value::{Class, Object, PropertyKey, Prototype, Symbol, TypeTag, Value};
}
