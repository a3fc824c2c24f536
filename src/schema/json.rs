// Copyright 2025 Cowboy AI, LLC.

//! JSON Schema backend built on `schemars`
//!
//! Rendering rules:
//! - union → `enum` when every member is a representable literal, `anyOf` otherwise
//! - intersection → `allOf`
//! - refine → `allOf: [base]` plus the refinement id under the configured
//!   extension keyword, resolved through [`Schema::refinement`](super::Schema::refinement)
//! - tuple → positional `items`, `additionalItems: false`, and `minItems`
//!   stopping before the trailing run of optional elements
//! - object → `properties` with `required` for every non-optional key;
//!   undeclared properties stay allowed
//! - set → array with `uniqueItems`; map → array of `[key, value]` pairs
//! - references → `$ref` into `definitions`
//!
//! Values JSON cannot carry (symbols, functions, `undefined`, `NaN`) render as
//! schemas nothing satisfies.

use std::collections::BTreeMap;

use schemars::schema::{
    ArrayValidation, InstanceType, ObjectValidation, RootSchema, Schema, SchemaObject,
    SingleOrVec, SubschemaValidation,
};
use serde::{Deserialize, Serialize};

use crate::errors::SchemaResult;
use crate::guard::GuardId;
use crate::literal::Literal;
use crate::schema::{SchemaBackend, SchemaNode};
use crate::value::{PropertyKey, TypeTag};

/// Settings for [`JsonSchemaBackend`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonSchemaConfig {
    /// `$schema` URI written at the root; `None` omits it
    pub meta_schema: Option<String>,
    /// Prefix of `$ref` pointers into the definitions table
    pub definitions_path: String,
    /// Emit `description`/`title` annotations
    pub descriptions: bool,
    /// Extension keyword carrying refinement ids
    pub refinement_keyword: String,
}

impl Default for JsonSchemaConfig {
    fn default() -> Self {
        Self {
            meta_schema: Some("http://json-schema.org/draft-07/schema#".to_string()),
            definitions_path: "#/definitions/".to_string(),
            descriptions: true,
            refinement_keyword: "x-refinement".to_string(),
        }
    }
}

/// Renders schema nodes as JSON Schema (draft-07) documents
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaBackend {
    config: JsonSchemaConfig,
}

impl JsonSchemaBackend {
    /// Backend name
    pub const NAME: &'static str = "json-schema";

    /// Backend with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with custom settings
    pub fn with_config(config: JsonSchemaConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &JsonSchemaConfig {
        &self.config
    }

    fn render_node(&self, node: &SchemaNode) -> Schema {
        match node {
            SchemaNode::Never => Schema::Bool(false),
            SchemaNode::Unknown => Schema::Bool(true),
            SchemaNode::Primitive(tag) => self.primitive(*tag),
            SchemaNode::Literal(literal) => self.literal(literal),
            SchemaNode::Optional(inner) => self.render_node(inner),
            SchemaNode::Union(members) => self.union(members),
            SchemaNode::Intersection(members) => {
                if members.is_empty() {
                    return Schema::Bool(true);
                }
                Schema::Object(SchemaObject {
                    subschemas: Some(Box::new(SubschemaValidation {
                        all_of: Some(members.iter().map(|m| self.render_node(m)).collect()),
                        ..Default::default()
                    })),
                    ..Default::default()
                })
            }
            SchemaNode::Refine {
                base,
                refinement,
                label,
            } => {
                let mut schema = SchemaObject {
                    subschemas: Some(Box::new(SubschemaValidation {
                        all_of: Some(vec![self.render_node(base)]),
                        ..Default::default()
                    })),
                    ..Default::default()
                };
                schema.extensions.insert(
                    self.config.refinement_keyword.clone(),
                    serde_json::Value::from(*refinement),
                );
                self.annotate(&mut schema, None, Some(label.clone()));
                Schema::Object(schema)
            }
            SchemaNode::Array(item) => Schema::Object(SchemaObject {
                instance_type: Some(InstanceType::Array.into()),
                array: Some(Box::new(ArrayValidation {
                    items: Some(SingleOrVec::Single(Box::new(self.render_node(item)))),
                    ..Default::default()
                })),
                ..Default::default()
            }),
            SchemaNode::Set(item) => Schema::Object(SchemaObject {
                instance_type: Some(InstanceType::Array.into()),
                array: Some(Box::new(ArrayValidation {
                    items: Some(SingleOrVec::Single(Box::new(self.render_node(item)))),
                    unique_items: Some(true),
                    ..Default::default()
                })),
                ..Default::default()
            }),
            SchemaNode::Tuple(elements) => Schema::Object(self.tuple(elements)),
            SchemaNode::Object {
                properties,
                plain_only,
            } => {
                let mut object = ObjectValidation::default();
                for (key, property) in properties {
                    // Symbol keys have no JSON spelling
                    let PropertyKey::String(name) = key else {
                        continue;
                    };
                    if !property.is_optional() {
                        object.required.insert(name.to_string());
                    }
                    object
                        .properties
                        .insert(name.to_string(), self.render_node(property.required()));
                }
                let mut schema = SchemaObject {
                    instance_type: Some(InstanceType::Object.into()),
                    object: Some(Box::new(object)),
                    ..Default::default()
                };
                if *plain_only {
                    self.annotate(&mut schema, None, Some("plain object".to_string()));
                }
                Schema::Object(schema)
            }
            SchemaNode::IndexRecord(value) => Schema::Object(SchemaObject {
                instance_type: Some(InstanceType::Object.into()),
                object: Some(Box::new(ObjectValidation {
                    additional_properties: Some(Box::new(self.render_node(value))),
                    ..Default::default()
                })),
                ..Default::default()
            }),
            SchemaNode::Map { key, value } => {
                let entry = SchemaObject {
                    instance_type: Some(InstanceType::Array.into()),
                    array: Some(Box::new(ArrayValidation {
                        items: Some(SingleOrVec::Vec(vec![
                            self.render_node(key),
                            self.render_node(value),
                        ])),
                        additional_items: Some(Box::new(Schema::Bool(false))),
                        min_items: Some(2),
                        max_items: Some(2),
                        ..Default::default()
                    })),
                    ..Default::default()
                };
                let mut schema = SchemaObject {
                    instance_type: Some(InstanceType::Array.into()),
                    array: Some(Box::new(ArrayValidation {
                        items: Some(SingleOrVec::Single(Box::new(Schema::Object(entry)))),
                        ..Default::default()
                    })),
                    ..Default::default()
                };
                self.annotate(&mut schema, None, Some("map entries".to_string()));
                Schema::Object(schema)
            }
            SchemaNode::Instance { class } => {
                let mut schema = SchemaObject {
                    instance_type: Some(InstanceType::Object.into()),
                    ..Default::default()
                };
                self.annotate(&mut schema, Some(class.clone()), None);
                Schema::Object(schema)
            }
            SchemaNode::Reference(id) => Schema::Object(SchemaObject {
                reference: Some(format!("{}{}", self.config.definitions_path, id)),
                ..Default::default()
            }),
        }
    }

    fn primitive(&self, tag: TypeTag) -> Schema {
        let instance_type: SingleOrVec<InstanceType> = match tag {
            TypeTag::Number => InstanceType::Number.into(),
            TypeTag::String => InstanceType::String.into(),
            TypeTag::Boolean => InstanceType::Boolean.into(),
            TypeTag::BigInt => InstanceType::Integer.into(),
            TypeTag::Object => SingleOrVec::Vec(vec![InstanceType::Object, InstanceType::Array]),
            TypeTag::Symbol | TypeTag::Function | TypeTag::Undefined => {
                return self.unrepresentable(tag.as_str());
            }
        };
        let mut schema = SchemaObject {
            instance_type: Some(instance_type),
            ..Default::default()
        };
        if tag == TypeTag::BigInt {
            self.annotate(&mut schema, None, Some("bigint".to_string()));
        }
        Schema::Object(schema)
    }

    fn literal(&self, literal: &Literal) -> Schema {
        match literal_json(literal) {
            Some(value) => Schema::Object(SchemaObject {
                const_value: Some(value),
                ..Default::default()
            }),
            None => self.unrepresentable(&literal.to_string()),
        }
    }

    fn union(&self, members: &[SchemaNode]) -> Schema {
        if members.is_empty() {
            return Schema::Bool(false);
        }

        let literals: Option<Vec<serde_json::Value>> = members
            .iter()
            .map(|member| match member {
                SchemaNode::Literal(literal) => literal_json(literal),
                _ => None,
            })
            .collect();
        if let Some(values) = literals {
            return Schema::Object(SchemaObject {
                enum_values: Some(values),
                ..Default::default()
            });
        }

        Schema::Object(SchemaObject {
            subschemas: Some(Box::new(SubschemaValidation {
                any_of: Some(members.iter().map(|m| self.render_node(m)).collect()),
                ..Default::default()
            })),
            ..Default::default()
        })
    }

    fn tuple(&self, elements: &[SchemaNode]) -> SchemaObject {
        let min_items = elements
            .iter()
            .rposition(|element| !element.is_optional())
            .map_or(0, |last_required| last_required + 1);
        SchemaObject {
            instance_type: Some(InstanceType::Array.into()),
            array: Some(Box::new(ArrayValidation {
                items: Some(SingleOrVec::Vec(
                    elements.iter().map(|e| self.render_node(e)).collect(),
                )),
                additional_items: Some(Box::new(Schema::Bool(false))),
                min_items: Some(count(min_items)),
                max_items: Some(count(elements.len())),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    fn unrepresentable(&self, what: &str) -> Schema {
        let mut schema = SchemaObject {
            subschemas: Some(Box::new(SubschemaValidation {
                not: Some(Box::new(Schema::Object(SchemaObject::default()))),
                ..Default::default()
            })),
            ..Default::default()
        };
        self.annotate(
            &mut schema,
            None,
            Some(format!("{what} has no JSON representation")),
        );
        Schema::Object(schema)
    }

    fn annotate(
        &self,
        schema: &mut SchemaObject,
        title: Option<String>,
        description: Option<String>,
    ) {
        if !self.config.descriptions {
            return;
        }
        let metadata = schema.metadata();
        if title.is_some() {
            metadata.title = title;
        }
        if description.is_some() {
            metadata.description = description;
        }
    }
}

impl SchemaBackend for JsonSchemaBackend {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn render(
        &self,
        root: &SchemaNode,
        definitions: &BTreeMap<GuardId, SchemaNode>,
    ) -> SchemaResult<serde_json::Value> {
        let mut document = RootSchema {
            meta_schema: self.config.meta_schema.clone(),
            schema: self.render_node(root).into_object(),
            ..Default::default()
        };
        for (id, node) in definitions {
            document
                .definitions
                .insert(id.to_string(), self.render_node(node));
        }
        Ok(serde_json::to_value(&document)?)
    }
}

fn literal_json(literal: &Literal) -> Option<serde_json::Value> {
    match literal {
        Literal::Undefined => None,
        Literal::Null => Some(serde_json::Value::Null),
        Literal::Bool(flag) => Some(serde_json::Value::Bool(*flag)),
        Literal::Number(number) => serde_json::Number::from_f64(*number).map(serde_json::Value::Number),
        Literal::BigInt(number) => Some(
            i64::try_from(*number)
                .map(serde_json::Value::from)
                .or_else(|_| u64::try_from(*number).map(serde_json::Value::from))
                .unwrap_or_else(|_| serde_json::Value::String(number.to_string())),
        ),
        Literal::String(text) => Some(serde_json::Value::String(text.clone())),
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
