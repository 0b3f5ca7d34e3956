//! Type descriptors
//!
//! The closed, recursive set of shapes a wire value can have. Descriptors are
//! built once per interface, ahead of use, and treated as immutable
//! configuration data. They drive both the codec and the schema builder.

use crate::error::{Result, WireError};
use crate::value::Value;

/// The first-order primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Float,
    Bool,
    String,
    Bytes,
}

impl PrimitiveKind {
    /// Name used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bytes => "bytes",
        }
    }
}

/// A declared field of a record descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub descriptor: TypeDescriptor,
}

/// A member of an enum descriptor: symbolic label plus the underlying scalar
/// that actually travels on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub label: String,
    pub value: Value,
}

/// Structural description of a value's shape
///
/// Container descriptors always carry fully-specified element descriptors; an
/// untyped container cannot be constructed. Union variant order is
/// semantically significant and preserved exactly as authored.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// Sugar for a union of the inner shape and null
    Optional(Box<TypeDescriptor>),
    ListOf(Box<TypeDescriptor>),
    /// Keys are always strings
    MapOf(Box<TypeDescriptor>),
    /// Fixed arity, heterogeneous
    TupleOf(Vec<TypeDescriptor>),
    /// Untagged: variants are tried in declared order
    UnionOf(Vec<TypeDescriptor>),
    EnumOf { name: String, members: Vec<EnumMember> },
    /// Named product type with a fixed, declared field set
    RecordOf { name: String, fields: Vec<FieldDescriptor> },
    /// Escape hatch: no validation, passed through as-is. Logged as a
    /// compatibility risk and never used for versioned interfaces.
    Any,
}

impl TypeDescriptor {
    pub fn int() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Float)
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Bool)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub fn bytes() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Bytes)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn list_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::ListOf(Box::new(element))
    }

    pub fn map_of(value: TypeDescriptor) -> Self {
        TypeDescriptor::MapOf(Box::new(value))
    }

    pub fn tuple_of(elements: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::TupleOf(elements)
    }

    pub fn union_of(variants: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::UnionOf(variants)
    }

    pub fn enum_of(name: impl Into<String>, members: Vec<(&str, Value)>) -> Self {
        TypeDescriptor::EnumOf {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(label, value)| EnumMember { label: label.to_string(), value })
                .collect(),
        }
    }

    pub fn record_of(name: impl Into<String>, fields: Vec<(&str, TypeDescriptor)>) -> Self {
        TypeDescriptor::RecordOf {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, descriptor)| FieldDescriptor { name: name.to_string(), descriptor })
                .collect(),
        }
    }

    /// Whether this descriptor admits null
    pub fn is_optional(&self) -> bool {
        match self {
            TypeDescriptor::Optional(_) | TypeDescriptor::Any => true,
            TypeDescriptor::UnionOf(variants) => variants.iter().any(|v| v.is_optional()),
            _ => false,
        }
    }

    /// Descriptor name used in error messages
    pub fn kind_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(k) => k.name().to_string(),
            TypeDescriptor::Optional(inner) => format!("optional<{}>", inner.kind_name()),
            TypeDescriptor::ListOf(e) => format!("list<{}>", e.kind_name()),
            TypeDescriptor::MapOf(v) => format!("map<string, {}>", v.kind_name()),
            TypeDescriptor::TupleOf(es) => format!("tuple[{}]", es.len()),
            TypeDescriptor::UnionOf(vs) => format!("union[{}]", vs.len()),
            TypeDescriptor::EnumOf { name, .. } => format!("enum {}", name),
            TypeDescriptor::RecordOf { name, .. } => format!("record {}", name),
            TypeDescriptor::Any => "any".to_string(),
        }
    }

    /// Check the construction-time invariants
    ///
    /// Containers must be fully typed, unions and tuples non-empty, enum
    /// members scalar and of one shared kind, record field names unique.
    /// These are declaration errors, caught before any value is encoded.
    pub fn validate(&self) -> Result<()> {
        match self {
            TypeDescriptor::Primitive(_) | TypeDescriptor::Any => Ok(()),
            TypeDescriptor::Optional(inner)
            | TypeDescriptor::ListOf(inner)
            | TypeDescriptor::MapOf(inner) => inner.validate(),
            TypeDescriptor::TupleOf(elements) => {
                if elements.is_empty() {
                    return Err(WireError::UnsupportedDescriptor(
                        "tuple must carry element descriptors".to_string(),
                    ));
                }
                elements.iter().try_for_each(|e| e.validate())
            }
            TypeDescriptor::UnionOf(variants) => {
                if variants.is_empty() {
                    return Err(WireError::UnsupportedDescriptor(
                        "union must carry variant descriptors".to_string(),
                    ));
                }
                variants.iter().try_for_each(|v| v.validate())
            }
            TypeDescriptor::EnumOf { name, members } => {
                if members.is_empty() {
                    return Err(WireError::UnsupportedDescriptor(format!(
                        "enum '{}' has no members",
                        name
                    )));
                }
                let first = members[0].value.kind_name();
                for member in members {
                    match member.value {
                        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {}
                        _ => {
                            return Err(WireError::UnsupportedDescriptor(format!(
                                "enum '{}' member '{}' is not a scalar",
                                name, member.label
                            )))
                        }
                    }
                    if member.value.kind_name() != first {
                        return Err(WireError::UnsupportedDescriptor(format!(
                            "enum '{}' mixes member kinds '{}' and '{}'",
                            name,
                            first,
                            member.value.kind_name()
                        )));
                    }
                }
                Ok(())
            }
            TypeDescriptor::RecordOf { name, fields } => {
                for (i, field) in fields.iter().enumerate() {
                    if fields[..i].iter().any(|f| f.name == field.name) {
                        return Err(WireError::UnsupportedDescriptor(format!(
                            "record '{}' declares field '{}' twice",
                            name, field.name
                        )));
                    }
                    field.descriptor.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// A declared operation parameter
///
/// A parameter without a default is required in the request schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub default: Option<Value>,
}

/// One named operation of an interface
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    pub returns: Option<TypeDescriptor>,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        OperationDescriptor {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            descriptor,
            default: None,
        });
        self
    }

    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
        default: Value,
    ) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            descriptor,
            default: Some(default),
        });
        self
    }

    pub fn returns(mut self, descriptor: TypeDescriptor) -> Self {
        self.returns = Some(descriptor);
        self
    }
}

/// A whole remoted interface: the named operations a client may call
///
/// Built once, ahead of use, and treated as immutable configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub description: String,
    pub operations: Vec<OperationDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        InterfaceDescriptor {
            name: name.into(),
            description: description.into(),
            operations: Vec::new(),
        }
    }

    pub fn operation(mut self, op: OperationDescriptor) -> Self {
        self.operations.push(op);
        self
    }

    /// Check every declared descriptor plus operation-name uniqueness
    pub fn validate(&self) -> Result<()> {
        for (i, op) in self.operations.iter().enumerate() {
            if self.operations[..i].iter().any(|o| o.name == op.name) {
                return Err(WireError::UnsupportedDescriptor(format!(
                    "interface '{}' declares operation '{}' twice",
                    self.name, op.name
                )));
            }
            for param in &op.params {
                param.descriptor.validate()?;
            }
            if let Some(returns) = &op.returns {
                returns.validate()?;
            }
        }
        Ok(())
    }
}
