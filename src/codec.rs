//! Structural codec
//!
//! Converts application values to and from the wire representation without an
//! explicit type tag. Both directions are pure functions over immutable
//! inputs, driven entirely by the [`TypeDescriptor`] tree.
//!
//! Untagged unions are resolved by trying variants in declared order:
//! the encode path uses the runtime check, the decode path the structural
//! matcher against the raw wire value. Variants that admit null are always
//! tried last, on both paths, so a present value is preferred over a null
//! match whenever both could apply.

use std::collections::BTreeMap;

use tracing::warn;

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::{Result, WireError};
use crate::matcher::{matches, runtime_matches};
use crate::value::Value;

/// Key of the uniform top-level envelope
pub const ENVELOPE_KEY: &str = "value";

/// Encode an application value for the wire
///
/// Every payload leaves as an object: a non-record result is wrapped as
/// `{"value": <encoded>}` so the transport layer can treat all responses
/// identically.
pub fn encode(value: &Value, descriptor: &TypeDescriptor) -> Result<Value> {
    let encoded = encode_value(value, descriptor)?;
    match encoded {
        Value::Rec(_) => Ok(encoded),
        other => {
            let mut envelope = BTreeMap::new();
            envelope.insert(ENVELOPE_KEY.to_string(), other);
            Ok(Value::Rec(envelope))
        }
    }
}

/// Decode a wire value against a descriptor
///
/// Undoes the top-level envelope first: for a record holding exactly the key
/// `"value"`, the unwrapped form is tried before the record itself, so a
/// present enveloped value always wins while maps and records that
/// legitimately carry a single `value` key still decode whole.
pub fn decode(value: &Value, descriptor: &TypeDescriptor) -> Result<Value> {
    if let Value::Rec(map) = value {
        if map.len() == 1 {
            if let Some(inner) = map.get(ENVELOPE_KEY) {
                if let Ok(decoded) = decode_value(inner, descriptor) {
                    return Ok(decoded);
                }
            }
        }
    }
    decode_value(value, descriptor)
}

fn type_mismatch(descriptor: &TypeDescriptor, value: &Value) -> WireError {
    WireError::TypeMismatch {
        expected: descriptor.kind_name(),
        actual: value.kind_name().to_string(),
    }
}

fn is_primitive(descriptor: &TypeDescriptor) -> bool {
    matches!(descriptor, TypeDescriptor::Primitive(_))
}

/// Union variants in matching order: declared order, except that variants
/// admitting null are moved to the back. This is the one deliberate reorder
/// in the system and it is applied identically on encode and decode.
fn ordered_variants(variants: &[TypeDescriptor]) -> Vec<&TypeDescriptor> {
    let mut ordered: Vec<&TypeDescriptor> =
        variants.iter().filter(|v| !v.is_optional()).collect();
    ordered.extend(variants.iter().filter(|v| v.is_optional()));
    ordered
}

fn encode_value(value: &Value, descriptor: &TypeDescriptor) -> Result<Value> {
    match descriptor {
        TypeDescriptor::Primitive(kind) => pass_primitive(value, *kind, descriptor),

        TypeDescriptor::Optional(inner) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                encode_value(value, inner)
            }
        }

        TypeDescriptor::ListOf(element) => match value {
            // Lists of primitives are copied wholesale, no per-element pass.
            Value::Seq(_) if is_primitive(element) => Ok(value.clone()),
            Value::Seq(items) => Ok(Value::Seq(
                items.iter().map(|v| encode_value(v, element)).collect::<Result<_>>()?,
            )),
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::MapOf(val_desc) => match value {
            Value::Rec(_) if is_primitive(val_desc) => Ok(value.clone()),
            Value::Rec(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    out.insert(k.clone(), encode_value(v, val_desc)?);
                }
                Ok(Value::Rec(out))
            }
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::TupleOf(elements) => match value {
            Value::Seq(items) if items.len() == elements.len() => Ok(Value::Seq(
                items
                    .iter()
                    .zip(elements)
                    .map(|(v, d)| encode_value(v, d))
                    .collect::<Result<_>>()?,
            )),
            Value::Seq(items) => Err(WireError::ShapeMismatch(format!(
                "tuple expects {} elements, got {}",
                elements.len(),
                items.len()
            ))),
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::UnionOf(variants) => {
            for variant in ordered_variants(variants) {
                if runtime_matches(value, variant) {
                    return encode_value(value, variant);
                }
            }
            Err(WireError::NoUnionVariantMatched(format!(
                "value of kind '{}' fits none of {} declared variants",
                value.kind_name(),
                variants.len()
            )))
        }

        // Wire form is the member's underlying scalar, never the label.
        TypeDescriptor::EnumOf { name, members } => match value {
            Value::String(label) => members
                .iter()
                .find(|m| &m.label == label)
                .map(|m| m.value.clone())
                .ok_or_else(|| WireError::TypeMismatch {
                    expected: format!("enum {}", name),
                    actual: format!("label '{}'", label),
                }),
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::RecordOf { name, fields } => match value {
            Value::Rec(map) => {
                let mut out = BTreeMap::new();
                for field in fields {
                    match map.get(&field.name) {
                        // Any-typed fields are copied as-is.
                        Some(v) if matches!(field.descriptor, TypeDescriptor::Any) => {
                            warn_any(&field.descriptor);
                            out.insert(field.name.clone(), v.clone());
                        }
                        Some(v) => {
                            out.insert(field.name.clone(), encode_value(v, &field.descriptor)?);
                        }
                        None if field.descriptor.is_optional() => {
                            out.insert(field.name.clone(), Value::Null);
                        }
                        None => {
                            return Err(WireError::MissingField {
                                record: name.clone(),
                                field: field.name.clone(),
                            })
                        }
                    }
                }
                Ok(Value::Rec(out))
            }
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::Any => {
            warn_any(descriptor);
            Ok(value.clone())
        }
    }
}

fn pass_primitive(
    value: &Value,
    kind: PrimitiveKind,
    descriptor: &TypeDescriptor,
) -> Result<Value> {
    let ok = matches!(
        (value, kind),
        (Value::Int(_), PrimitiveKind::Int)
            | (Value::Float(_), PrimitiveKind::Float)
            | (Value::Bool(_), PrimitiveKind::Bool)
            | (Value::String(_), PrimitiveKind::String)
            | (Value::Bytes(_), PrimitiveKind::Bytes)
    );
    if ok {
        Ok(value.clone())
    } else {
        Err(type_mismatch(descriptor, value))
    }
}

fn warn_any(descriptor: &TypeDescriptor) {
    warn!(
        descriptor = %descriptor.kind_name(),
        "Any passes values through unvalidated; not safe for versioned interfaces"
    );
}

fn decode_value(value: &Value, descriptor: &TypeDescriptor) -> Result<Value> {
    match descriptor {
        TypeDescriptor::Primitive(kind) => pass_primitive(value, *kind, descriptor),

        TypeDescriptor::Optional(inner) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                decode_value(value, inner)
            }
        }

        TypeDescriptor::ListOf(element) => match value {
            Value::Seq(_) if is_primitive(element) => Ok(value.clone()),
            Value::Seq(items) => Ok(Value::Seq(
                items.iter().map(|v| decode_value(v, element)).collect::<Result<_>>()?,
            )),
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::MapOf(val_desc) => match value {
            Value::Rec(_) if is_primitive(val_desc) => Ok(value.clone()),
            Value::Rec(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    out.insert(k.clone(), decode_value(v, val_desc)?);
                }
                Ok(Value::Rec(out))
            }
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::TupleOf(elements) => match value {
            Value::Seq(items) if items.len() == elements.len() => Ok(Value::Seq(
                items
                    .iter()
                    .zip(elements)
                    .map(|(v, d)| decode_value(v, d))
                    .collect::<Result<_>>()?,
            )),
            Value::Seq(items) => Err(WireError::ShapeMismatch(format!(
                "tuple expects {} elements, got {}",
                elements.len(),
                items.len()
            ))),
            _ => Err(type_mismatch(descriptor, value)),
        },

        // No discriminant on the wire: re-derive the variant structurally,
        // in declared order.
        TypeDescriptor::UnionOf(variants) => {
            for variant in ordered_variants(variants) {
                if matches(value, variant) {
                    return decode_value(value, variant);
                }
            }
            Err(WireError::NoUnionVariantMatched(format!(
                "wire value of kind '{}' fits none of {} declared variants",
                value.kind_name(),
                variants.len()
            )))
        }

        TypeDescriptor::EnumOf { name, members } => members
            .iter()
            .find(|m| &m.value == value)
            .map(|m| Value::String(m.label.clone()))
            .ok_or_else(|| WireError::TypeMismatch {
                expected: format!("enum {}", name),
                actual: value.kind_name().to_string(),
            }),

        TypeDescriptor::RecordOf { name, fields } => match value {
            Value::Rec(map) => {
                let mut out = BTreeMap::new();
                // Unknown extra wire keys are tolerated and dropped; only the
                // declared field set is rebuilt.
                for field in fields {
                    match map.get(&field.name) {
                        Some(v) if matches!(field.descriptor, TypeDescriptor::Any) => {
                            warn_any(&field.descriptor);
                            out.insert(field.name.clone(), v.clone());
                        }
                        Some(v) => {
                            out.insert(field.name.clone(), decode_value(v, &field.descriptor)?);
                        }
                        None if field.descriptor.is_optional() => {
                            out.insert(field.name.clone(), Value::Null);
                        }
                        None => {
                            return Err(WireError::MissingField {
                                record: name.clone(),
                                field: field.name.clone(),
                            })
                        }
                    }
                }
                Ok(Value::Rec(out))
            }
            _ => Err(type_mismatch(descriptor, value)),
        },

        TypeDescriptor::Any => {
            warn_any(descriptor);
            Ok(value.clone())
        }
    }
}
