// Copyright 2025 Cowboy AI, LLC.

//! Schema projection
//!
//! Any guard can be asked for an equivalent declarative schema. Projection
//! happens in two steps:
//!
//! 1. The guard graph is walked into a backend-neutral [`SchemaNode`] tree.
//!    Each combinator supplies its own rule through [`TypeGuard::project`].
//!    Guards already being projected are emitted as [`SchemaNode::Reference`]
//!    and hoisted into a definitions table, so recursive descriptions stay
//!    finite.
//! 2. The resolved [`SchemaBackend`] renders the tree into a document.
//!
//! The backend is an optional collaborator resolved on first use; see
//! [`backend`]. The resulting [`Schema`] is cached on the guard.

pub mod backend;
#[cfg(feature = "json-schema")]
pub mod json;

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::algebra::Refinement;
use crate::errors::SchemaResult;
use crate::guard::{GuardId, TypeGuard};
use crate::literal::Literal;
use crate::value::{PropertyKey, TypeTag, Value};

pub use backend::{
    install_backend, reset_backend, resolve_backend, set_backend_loader, BackendLoader,
    SchemaBackend,
};
#[cfg(feature = "json-schema")]
pub use json::{JsonSchemaBackend, JsonSchemaConfig};

/// Backend-neutral schema vocabulary
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Matches nothing
    Never,
    /// Matches everything
    Unknown,
    /// A `typeof` category
    Primitive(TypeTag),
    /// Exactly one scalar
    Literal(Literal),
    /// The inner schema, or a missing value
    Optional(Box<SchemaNode>),
    /// Any of the members
    Union(Vec<SchemaNode>),
    /// All of the members
    Intersection(Vec<SchemaNode>),
    /// Base schema plus a post-hoc check
    Refine {
        /// Schema the value must satisfy first
        base: Box<SchemaNode>,
        /// Id of the [`Refinement`] carried by the rendered [`Schema`]
        refinement: u64,
        /// Refinement label
        label: String,
    },
    /// Homogeneous list
    Array(Box<SchemaNode>),
    /// Homogeneous list without duplicates
    Set(Box<SchemaNode>),
    /// Positional list
    Tuple(Vec<SchemaNode>),
    /// Keyed object; undeclared properties are allowed
    Object {
        /// Declared properties in template order
        properties: Vec<(PropertyKey, SchemaNode)>,
        /// Only plain objects qualify
        plain_only: bool,
    },
    /// Object with arbitrary keys and uniform values
    IndexRecord(Box<SchemaNode>),
    /// Collection of key/value pairs
    Map {
        /// Key schema
        key: Box<SchemaNode>,
        /// Value schema
        value: Box<SchemaNode>,
    },
    /// Instance of a named class
    Instance {
        /// Class name
        class: String,
    },
    /// Pointer to a hoisted definition
    Reference(GuardId),
}

impl SchemaNode {
    /// Literal node; the missing-value literal becomes an optional `Never`
    pub fn literal(literal: &Literal) -> SchemaNode {
        match literal {
            Literal::Undefined => SchemaNode::Optional(Box::new(SchemaNode::Never)),
            other => SchemaNode::Literal(other.clone()),
        }
    }

    /// Union node with `Never` members dropped, nested unions flattened and
    /// optionality hoisted to the outside
    pub fn union(nodes: impl IntoIterator<Item = SchemaNode>) -> SchemaNode {
        let mut optional = false;
        let mut members = Vec::new();
        for node in nodes {
            let node = match node {
                SchemaNode::Optional(inner) => {
                    optional = true;
                    *inner
                }
                other => other,
            };
            match node {
                SchemaNode::Never => {}
                SchemaNode::Union(inner) => members.extend(inner),
                other => members.push(other),
            }
        }

        let union = match members.len() {
            0 => SchemaNode::Never,
            1 => members.remove(0),
            _ => SchemaNode::Union(members),
        };
        if optional {
            SchemaNode::Optional(Box::new(union))
        } else {
            union
        }
    }

    /// Intersection node with `Unknown` members dropped; optional only if every member is
    pub fn intersection(nodes: impl IntoIterator<Item = SchemaNode>) -> SchemaNode {
        let mut all_optional = true;
        let mut members = Vec::new();
        for node in nodes {
            let node = match node {
                SchemaNode::Optional(inner) => *inner,
                other => {
                    all_optional = false;
                    other
                }
            };
            if node != SchemaNode::Unknown {
                members.push(node);
            }
        }

        let intersection = match members.len() {
            0 => SchemaNode::Unknown,
            1 => members.remove(0),
            _ => SchemaNode::Intersection(members),
        };
        // `all_optional` is vacuously true for an empty intersection, which is
        // already the top type
        if all_optional && intersection != SchemaNode::Unknown {
            SchemaNode::Optional(Box::new(intersection))
        } else {
            intersection
        }
    }

    /// True if the value may be missing
    pub fn is_optional(&self) -> bool {
        matches!(self, SchemaNode::Optional(_))
    }

    /// The node without its optional marker
    pub fn required(&self) -> &SchemaNode {
        match self {
            SchemaNode::Optional(inner) => inner.required(),
            other => other,
        }
    }
}

/// State of one projection walk
#[derive(Debug, Default)]
pub struct Projection {
    aliases: BTreeMap<TypeId, GuardId>,
    in_progress: Vec<GuardId>,
    reentered: BTreeSet<GuardId>,
    definitions: BTreeMap<GuardId, SchemaNode>,
    refinements: BTreeMap<u64, Refinement>,
}

impl Projection {
    /// Start an empty walk
    pub fn new() -> Self {
        Self::default()
    }

    /// Project a sub-guard, emitting a reference if it is already being projected
    ///
    /// Guards sharing a [`TypeGuard::projection_alias`] are tracked under the
    /// id of the first one seen.
    pub fn node_for<G: TypeGuard + ?Sized>(&mut self, guard: &G) -> SchemaNode {
        let id = match guard.projection_alias() {
            Some(alias) => *self.aliases.entry(alias).or_insert_with(|| guard.id()),
            None => guard.id(),
        };
        if self.definitions.contains_key(&id) {
            return SchemaNode::Reference(id);
        }
        if self.in_progress.contains(&id) {
            self.reentered.insert(id);
            return SchemaNode::Reference(id);
        }

        self.in_progress.push(id);
        let node = guard.project(self);
        self.in_progress.pop();

        if self.reentered.remove(&id) {
            self.definitions.insert(id, node);
            SchemaNode::Reference(id)
        } else {
            node
        }
    }

    /// Record a refinement so the rendered schema can delegate to it
    pub fn register_refinement(&mut self, refinement: &Refinement) {
        self.refinements
            .entry(refinement.id())
            .or_insert_with(|| refinement.clone());
    }

    /// Definitions hoisted so far
    pub fn definitions(&self) -> &BTreeMap<GuardId, SchemaNode> {
        &self.definitions
    }

    fn finish(self) -> (BTreeMap<GuardId, SchemaNode>, BTreeMap<u64, Refinement>) {
        (self.definitions, self.refinements)
    }
}

/// A guard rendered by a schema backend
#[derive(Debug)]
pub struct Schema {
    backend: String,
    root: SchemaNode,
    document: serde_json::Value,
    refinements: BTreeMap<u64, Refinement>,
}

impl Schema {
    /// Name of the backend that rendered this schema
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Backend-neutral root node the document was rendered from
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The rendered document
    pub fn document(&self) -> &serde_json::Value {
        &self.document
    }

    /// Refinements referenced by the document
    pub fn refinements(&self) -> impl Iterator<Item = &Refinement> {
        self.refinements.values()
    }

    /// Refinement by id
    pub fn refinement(&self, id: u64) -> Option<&Refinement> {
        self.refinements.get(&id)
    }

    /// Run the post-hoc check the document references under `id`
    pub fn check_refinement(&self, id: u64, value: &Value) -> Option<bool> {
        self.refinement(id).map(|refinement| refinement.check(value))
    }
}

pub(crate) fn project<G: TypeGuard + ?Sized>(guard: &G) -> SchemaResult<Arc<Schema>> {
    if let Some(schema) = guard.meta().cached_schema() {
        return Ok(schema);
    }
    let backend = resolve_backend()?;
    project_with(guard, backend.as_ref())
}

pub(crate) fn project_with<G: TypeGuard + ?Sized>(
    guard: &G,
    backend: &dyn SchemaBackend,
) -> SchemaResult<Arc<Schema>> {
    if let Some(schema) = guard.meta().cached_schema() {
        return Ok(schema);
    }

    let mut projection = Projection::new();
    let root = projection.node_for(guard);
    let (definitions, refinements) = projection.finish();
    let document = backend.render(&root, &definitions)?;

    let backend_name = backend.name();
    debug!(
        guard = %guard.id(),
        backend = %backend_name,
        definitions = definitions.len(),
        refinements = refinements.len(),
        "Projected type guard schema"
    );

    let schema = Arc::new(Schema {
        backend: backend_name,
        root,
        document,
        refinements,
    });
    Ok(guard.meta().store_schema(schema))
}
