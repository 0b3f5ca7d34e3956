//! Schema building
//!
//! Renders a [`TypeDescriptor`] tree into a deterministic, JSON-schema-like
//! [`SchemaNode`]. Record fields, required lists, enum members and union arms
//! are all sorted before emission, so two structurally-identical interfaces
//! always render byte-identically regardless of declaration order. That
//! stability is what makes the interface hash reproducible across rebuilds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::descriptor::{InterfaceDescriptor, OperationDescriptor, PrimitiveKind, TypeDescriptor};
use crate::error::Result;

/// The closed set of schema type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    /// Escape hatch, never part of a versioned interface
    Any,
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Any => "any",
        }
    }
}

/// A JSON-schema-like structural description of a descriptor
///
/// Union schemas carry `oneOf` and no `type`; everything else carries a
/// `type` plus the keys relevant to it. Serialization skips absent keys so
/// the canonical rendering stays minimal and stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(rename = "prefixItems", skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<SchemaNode>>,
    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaNode>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl SchemaNode {
    /// A bare node of the given type
    pub fn of(kind: SchemaKind) -> Self {
        SchemaNode {
            schema_type: Some(kind),
            ..Default::default()
        }
    }

    fn with_format(kind: SchemaKind, format: &str) -> Self {
        SchemaNode {
            schema_type: Some(kind),
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    /// Canonical JSON rendering; deterministic for identical structure
    pub fn canonical_json(&self) -> String {
        // Struct fields serialize in declared order and property maps are
        // BTreeMaps, so this cannot vary between builds.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Build the schema for a descriptor
///
/// One case per descriptor variant. `Optional` unwraps to its inner schema;
/// optionality is expressed through the parent record's `required` list.
pub fn build_schema(descriptor: &TypeDescriptor) -> Result<SchemaNode> {
    descriptor.validate()?;
    Ok(render(descriptor))
}

fn render(descriptor: &TypeDescriptor) -> SchemaNode {
    match descriptor {
        TypeDescriptor::Primitive(kind) => match kind {
            PrimitiveKind::Int => SchemaNode::of(SchemaKind::Integer),
            PrimitiveKind::Float => SchemaNode::with_format(SchemaKind::Number, "float"),
            PrimitiveKind::Bool => SchemaNode::of(SchemaKind::Boolean),
            PrimitiveKind::String => SchemaNode::of(SchemaKind::String),
            PrimitiveKind::Bytes => SchemaNode::with_format(SchemaKind::String, "byte"),
        },

        TypeDescriptor::Optional(inner) => render(inner),

        TypeDescriptor::ListOf(element) => SchemaNode {
            schema_type: Some(SchemaKind::Array),
            items: Some(Box::new(render(element))),
            ..Default::default()
        },

        TypeDescriptor::MapOf(val_desc) => SchemaNode {
            schema_type: Some(SchemaKind::Object),
            additional_properties: Some(Box::new(render(val_desc))),
            ..Default::default()
        },

        TypeDescriptor::TupleOf(elements) => SchemaNode {
            schema_type: Some(SchemaKind::Array),
            prefix_items: Some(elements.iter().map(render).collect()),
            ..Default::default()
        },

        TypeDescriptor::UnionOf(variants) => {
            let mut arms: Vec<SchemaNode> = variants.iter().map(render).collect();
            arms.sort_by_key(|a| a.canonical_json());
            SchemaNode {
                one_of: Some(arms),
                ..Default::default()
            }
        }

        TypeDescriptor::EnumOf { members, .. } => {
            let mut sorted = members.clone();
            sorted.sort_by(|a, b| a.label.cmp(&b.label));
            // Wire form is the underlying scalar, so the schema type follows
            // the member values, not the labels.
            let kind = match sorted[0].value {
                crate::value::Value::Int(_) => SchemaKind::Integer,
                crate::value::Value::Float(_) => SchemaKind::Number,
                crate::value::Value::Bool(_) => SchemaKind::Boolean,
                _ => SchemaKind::String,
            };
            SchemaNode {
                schema_type: Some(kind),
                enum_values: Some(sorted.iter().map(|m| m.value.to_json()).collect()),
                ..Default::default()
            }
        }

        TypeDescriptor::RecordOf { fields, .. } => {
            let mut sorted: Vec<_> = fields.iter().collect();
            sorted.sort_by(|a, b| a.name.cmp(&b.name));

            let mut properties = BTreeMap::new();
            let mut required = Vec::new();
            for field in sorted {
                if !field.descriptor.is_optional() {
                    required.push(field.name.clone());
                }
                properties.insert(field.name.clone(), render(&field.descriptor));
            }

            SchemaNode {
                schema_type: Some(SchemaKind::Object),
                properties: Some(properties),
                required: if required.is_empty() { None } else { Some(required) },
                ..Default::default()
            }
        }

        TypeDescriptor::Any => {
            warn!("Any in a schema position is a compatibility risk; it cannot be versioned");
            SchemaNode::of(SchemaKind::Any)
        }
    }
}

/// Schema for one named operation: the request body plus an optional
/// response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSchema {
    pub request: SchemaNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<SchemaNode>,
}

/// The built schema of a whole interface: named paths, each with a
/// request/response schema. This is the unit the compatibility analyzer
/// diffs and the version hasher fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSchema {
    pub name: String,
    pub description: String,
    /// Keyed by path (`/{operation}`), sorted
    pub paths: BTreeMap<String, OperationSchema>,
}

impl InterfaceSchema {
    /// Render as an OpenAPI-style document (`{openapi, info, paths}`),
    /// directly embeddable by documentation and compatibility tooling.
    pub fn to_openapi(&self) -> serde_json::Value {
        let mut paths = serde_json::Map::new();
        for (path, op) in &self.paths {
            let request_body = serde_json::json!({
                "content": { "application/json": { "schema": &op.request } }
            });
            let responses = match &op.response {
                Some(schema) => serde_json::json!({
                    "200": { "content": { "application/json": { "schema": schema } } }
                }),
                None => serde_json::json!({ "200": { "description": "ok" } }),
            };
            paths.insert(
                path.clone(),
                serde_json::json!({ "post": { "requestBody": request_body, "responses": responses } }),
            );
        }

        serde_json::json!({
            "openapi": "3.1.0",
            "info": { "title": &self.name, "description": &self.description },
            "paths": paths,
        })
    }

    /// Canonical JSON rendering of the whole interface document
    pub fn canonical_json(&self) -> String {
        self.to_openapi().to_string()
    }
}

/// Build the full interface schema for a declared interface
///
/// Each operation becomes a path `/{name}` whose request schema is an object
/// of its parameters; parameters without defaults are required. A non-object
/// response schema is wrapped as `{"value": ...}`, mirroring the codec's wire
/// envelope.
pub fn build_interface_schema(interface: &InterfaceDescriptor) -> Result<InterfaceSchema> {
    interface.validate()?;

    let mut paths = BTreeMap::new();

    for op in &interface.operations {
        paths.insert(format!("/{}", op.name), build_operation_schema(op)?);
    }

    Ok(InterfaceSchema {
        name: interface.name.clone(),
        description: interface.description.clone(),
        paths,
    })
}

fn build_operation_schema(op: &OperationDescriptor) -> Result<OperationSchema> {
    let mut properties = BTreeMap::new();
    let mut required = Vec::new();

    for param in &op.params {
        let mut schema = build_schema(&param.descriptor)?;
        match &param.default {
            Some(default) => schema.default = Some(default.to_json()),
            None => required.push(param.name.clone()),
        }
        properties.insert(param.name.clone(), schema);
    }
    required.sort();

    let request = SchemaNode {
        schema_type: Some(SchemaKind::Object),
        properties: Some(properties),
        required: if required.is_empty() { None } else { Some(required) },
        ..Default::default()
    };

    let response = match &op.returns {
        None => None,
        Some(descriptor) => {
            let schema = build_schema(descriptor)?;
            if schema.schema_type == Some(SchemaKind::Object) {
                Some(schema)
            } else {
                // Envelope non-object responses, matching the codec.
                let mut properties = BTreeMap::new();
                properties.insert("value".to_string(), schema);
                Some(SchemaNode {
                    schema_type: Some(SchemaKind::Object),
                    properties: Some(properties),
                    ..Default::default()
                })
            }
        }
    };

    Ok(OperationSchema { request, response })
}
