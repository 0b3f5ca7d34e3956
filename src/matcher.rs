//! Structural matching
//!
//! The wire format carries no discriminant tag, so the active variant of an
//! untagged union has to be re-derived from shape alone. [`matches`] decides
//! whether a wire value is compatible with a descriptor; it drives union
//! decode and doubles as a general payload validator. [`runtime_matches`] is
//! the encode-side counterpart: it inspects application-side values, where an
//! enum is still its symbolic label and a quick first-element probe is enough
//! for lists.

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::value::Value;

fn primitive_matches(value: &Value, kind: PrimitiveKind) -> bool {
    matches!(
        (value, kind),
        (Value::Int(_), PrimitiveKind::Int)
            | (Value::Float(_), PrimitiveKind::Float)
            | (Value::Bool(_), PrimitiveKind::Bool)
            | (Value::String(_), PrimitiveKind::String)
            | (Value::Bytes(_), PrimitiveKind::Bytes)
    )
}

/// Check whether a wire value's shape is compatible with a descriptor
///
/// Record matching is open: unknown extra keys are tolerated, since
/// cross-version payloads may carry additive fields. An empty list matches
/// any element type; that is a policy choice, not a gap.
pub fn matches(value: &Value, descriptor: &TypeDescriptor) -> bool {
    match descriptor {
        TypeDescriptor::Primitive(kind) => primitive_matches(value, *kind),
        TypeDescriptor::Optional(inner) => value.is_null() || matches(value, inner),
        TypeDescriptor::ListOf(element) => match value {
            Value::Seq(items) => items.iter().all(|v| matches(v, element)),
            _ => false,
        },
        TypeDescriptor::MapOf(val_desc) => match value {
            Value::Rec(map) => map.values().all(|v| matches(v, val_desc)),
            _ => false,
        },
        TypeDescriptor::TupleOf(elements) => match value {
            Value::Seq(items) => {
                items.len() == elements.len()
                    && items.iter().zip(elements).all(|(v, d)| matches(v, d))
            }
            _ => false,
        },
        TypeDescriptor::UnionOf(variants) => variants.iter().any(|d| matches(value, d)),
        TypeDescriptor::EnumOf { members, .. } => members.iter().any(|m| &m.value == value),
        TypeDescriptor::RecordOf { fields, .. } => match value {
            Value::Rec(map) => fields.iter().all(|f| {
                map.get(&f.name)
                    .map(|v| matches(v, &f.descriptor))
                    .unwrap_or(false)
            }),
            _ => false,
        },
        TypeDescriptor::Any => true,
    }
}

/// Encode-side variant check against an application value
///
/// Differs from [`matches`] in two ways: enums match on their symbolic label
/// (the underlying scalar only exists after encoding), and lists probe just
/// their first element.
pub fn runtime_matches(value: &Value, descriptor: &TypeDescriptor) -> bool {
    match descriptor {
        TypeDescriptor::Primitive(kind) => primitive_matches(value, *kind),
        TypeDescriptor::Optional(inner) => value.is_null() || runtime_matches(value, inner),
        TypeDescriptor::ListOf(element) => match value {
            Value::Seq(items) => match items.first() {
                Some(first) => runtime_matches(first, element),
                None => true,
            },
            _ => false,
        },
        TypeDescriptor::MapOf(val_desc) => match value {
            Value::Rec(map) => map.values().all(|v| runtime_matches(v, val_desc)),
            _ => false,
        },
        TypeDescriptor::TupleOf(elements) => match value {
            Value::Seq(items) => {
                items.len() == elements.len()
                    && items.iter().zip(elements).all(|(v, d)| runtime_matches(v, d))
            }
            _ => false,
        },
        TypeDescriptor::UnionOf(variants) => variants.iter().any(|d| runtime_matches(value, d)),
        TypeDescriptor::EnumOf { members, .. } => match value {
            Value::String(label) => members.iter().any(|m| &m.label == label),
            _ => false,
        },
        TypeDescriptor::RecordOf { fields, .. } => match value {
            Value::Rec(map) => fields.iter().all(|f| {
                map.get(&f.name)
                    .map(|v| runtime_matches(v, &f.descriptor))
                    .unwrap_or(f.descriptor.is_optional())
            }),
            _ => false,
        },
        TypeDescriptor::Any => true,
    }
}
