//! Schema compatibility analysis
//!
//! Compares two built schemas of the same interface and decides how much
//! compatibility was lost, following the basic rules of API evolution:
//!
//! - properties or paths removed from the new schema bump the major version
//! - properties or paths added bump the minor version
//! - properties changing from required to optional bump the patch version
//! - properties changing from optional to required bump the major version

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WireError};
use crate::schema::{InterfaceSchema, SchemaKind, SchemaNode};

/// The version bump a schema change requires
///
/// Totally ordered; a diff pass only ever moves up the lattice. Once MAJOR is
/// reached no further check may downgrade it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl VersionBump {
    /// `merge(a, b) = max(a, b)`
    pub fn merge(self, other: VersionBump) -> VersionBump {
        self.max(other)
    }
}

/// Diff two whole interfaces
///
/// A path present in `old` but missing from `new` is breaking; a path added
/// in `new` is additive. Paths present in both are diffed on their request
/// schema. The result is the maximum bump across all paths, and the scan
/// stops as soon as MAJOR is reached.
pub fn diff_interface(old: &InterfaceSchema, new: &InterfaceSchema) -> Result<VersionBump> {
    let mut bump = VersionBump::None;

    for (path, old_op) in &old.paths {
        let Some(new_op) = new.paths.get(path) else {
            info!(path = %path, "path missing from new schema, bumping major version");
            return Ok(VersionBump::Major);
        };

        bump = bump.merge(diff_schema_at(&old_op.request, &new_op.request, path)?);
        if bump == VersionBump::Major {
            return Ok(bump);
        }
    }

    for path in new.paths.keys() {
        if !old.paths.contains_key(path) {
            info!(path = %path, "path added in new schema, bumping minor version");
            bump = bump.merge(VersionBump::Minor);
        }
    }

    Ok(bump)
}

/// Diff two schema components
pub fn diff_schema(old: &SchemaNode, new: &SchemaNode) -> Result<VersionBump> {
    diff_schema_at(old, new, "")
}

fn diff_schema_at(old: &SchemaNode, new: &SchemaNode, path: &str) -> Result<VersionBump> {
    diff_component(old, new, path, VersionBump::None)
}

fn diff_component(
    old: &SchemaNode,
    new: &SchemaNode,
    path: &str,
    mut bump: VersionBump,
) -> Result<VersionBump> {
    if let Some(old_arms) = &old.one_of {
        let Some(new_arms) = &new.one_of else {
            info!(path, "old schema is a oneOf and new schema is not, bumping major version");
            return Ok(VersionBump::Major);
        };

        // Untagged unions: compare arms as sets of rendered schemas. A lost
        // arm narrows what the interface accepts; a gained arm widens it.
        let old_rendered: Vec<String> = old_arms.iter().map(|a| a.canonical_json()).collect();
        let new_rendered: Vec<String> = new_arms.iter().map(|a| a.canonical_json()).collect();
        for arm in &old_rendered {
            if !new_rendered.contains(arm) {
                info!(path, "union arm removed in new schema, bumping major version");
                return Ok(VersionBump::Major);
            }
        }
        for arm in &new_rendered {
            if !old_rendered.contains(arm) {
                info!(path, "union arm added in new schema, bumping patch version");
                bump = bump.merge(VersionBump::Patch);
            }
        }
        return Ok(bump);
    }

    if new.one_of.is_some() {
        info!(path, "new schema is a oneOf and old schema is not, bumping patch version");
        // Flexibility was added around the old shape; nothing below it can be
        // compared one-to-one anymore.
        return Ok(bump.merge(VersionBump::Patch));
    }

    let old_kind = old
        .schema_type
        .ok_or_else(|| WireError::UnknownSchemaType("old schema carries no type".to_string()))?;
    let new_kind = new
        .schema_type
        .ok_or_else(|| WireError::UnknownSchemaType("new schema carries no type".to_string()))?;

    if bump == VersionBump::Major {
        return Ok(bump);
    }

    match old_kind {
        SchemaKind::Object => {
            if new_kind != SchemaKind::Object {
                info!(path, "old schema is an object and new schema is not, bumping major version");
                return Ok(VersionBump::Major);
            }
            bump = diff_object(old, new, path, bump)?;
        }

        SchemaKind::String | SchemaKind::Number | SchemaKind::Integer | SchemaKind::Boolean => {
            if old_kind != new_kind {
                info!(
                    path,
                    old = old_kind.name(),
                    new = new_kind.name(),
                    "schema type changed, bumping major version"
                );
                return Ok(VersionBump::Major);
            }
            if old.format.is_some() && old.format != new.format {
                info!(path, "schema format changed, bumping major version");
                return Ok(VersionBump::Major);
            }
            bump = diff_enum_values(old, new, path, bump);
        }

        SchemaKind::Array => {
            if new_kind != SchemaKind::Array {
                info!(path, "old schema is an array and new schema is not, bumping major version");
                return Ok(VersionBump::Major);
            }
            bump = diff_array(old, new, path, bump)?;
        }

        SchemaKind::Any => {
            return Err(WireError::UnknownSchemaType(
                "schema of type 'any' cannot be diffed".to_string(),
            ))
        }
    }

    Ok(bump)
}

fn diff_object(
    old: &SchemaNode,
    new: &SchemaNode,
    path: &str,
    mut bump: VersionBump,
) -> Result<VersionBump> {
    if let Some(old_props) = &old.properties {
        let Some(new_props) = &new.properties else {
            info!(path, "properties missing from new schema, bumping major version");
            return Ok(VersionBump::Major);
        };

        for (name, old_prop) in old_props {
            let Some(new_prop) = new_props.get(name) else {
                info!(path, property = %name, "property missing from new schema, bumping major version");
                return Ok(VersionBump::Major);
            };
            let child_path = format!("{}.{}", path, name);
            bump = bump.merge(diff_component(old_prop, new_prop, &child_path, bump)?);
            if bump == VersionBump::Major {
                return Ok(bump);
            }
        }

        for name in new_props.keys() {
            if !old_props.contains_key(name) {
                info!(path, property = %name, "property added in new schema, bumping minor version");
                bump = bump.merge(VersionBump::Minor);
            }
        }
    }

    let empty = Vec::new();
    let old_required = old.required.as_ref().unwrap_or(&empty);
    let new_required = new.required.as_ref().unwrap_or(&empty);

    for name in old_required {
        if !new_required.contains(name) {
            info!(path, property = %name, "property became optional, bumping patch version");
            bump = bump.merge(VersionBump::Patch);
        }
    }
    for name in new_required {
        if !old_required.contains(name) {
            info!(path, property = %name, "property became required, bumping major version");
            return Ok(VersionBump::Major);
        }
    }

    if let Some(old_extra) = &old.additional_properties {
        let Some(new_extra) = &new.additional_properties else {
            info!(path, "additionalProperties missing from new schema, bumping major version");
            return Ok(VersionBump::Major);
        };
        let child_path = format!("{}.additionalProperties", path);
        bump = bump.merge(diff_component(old_extra, new_extra, &child_path, bump)?);
    }

    Ok(bump)
}

fn diff_array(
    old: &SchemaNode,
    new: &SchemaNode,
    path: &str,
    mut bump: VersionBump,
) -> Result<VersionBump> {
    if let Some(old_items) = &old.items {
        let Some(new_items) = &new.items else {
            info!(path, "array items missing from new schema, bumping major version");
            return Ok(VersionBump::Major);
        };
        let child_path = format!("{}.items", path);
        bump = bump.merge(diff_component(old_items, new_items, &child_path, bump)?);
        if bump == VersionBump::Major {
            return Ok(bump);
        }
    }

    if let Some(old_prefix) = &old.prefix_items {
        let Some(new_prefix) = &new.prefix_items else {
            info!(path, "array prefix items missing from new schema, bumping major version");
            return Ok(VersionBump::Major);
        };
        if old_prefix.len() != new_prefix.len() {
            info!(path, "array prefix item count changed, bumping major version");
            return Ok(VersionBump::Major);
        }
        for (i, (old_item, new_item)) in old_prefix.iter().zip(new_prefix).enumerate() {
            let child_path = format!("{}.prefixItems[{}]", path, i);
            bump = bump.merge(diff_component(old_item, new_item, &child_path, bump)?);
            if bump == VersionBump::Major {
                return Ok(bump);
            }
        }
    }

    Ok(bump)
}

fn diff_enum_values(
    old: &SchemaNode,
    new: &SchemaNode,
    path: &str,
    mut bump: VersionBump,
) -> VersionBump {
    let (Some(old_members), Some(new_members)) = (&old.enum_values, &new.enum_values) else {
        return bump;
    };

    for member in old_members {
        if !new_members.contains(member) {
            info!(path, "enum member removed in new schema, bumping major version");
            return VersionBump::Major;
        }
    }
    for member in new_members {
        if !old_members.contains(member) {
            info!(path, "enum member added in new schema, bumping minor version");
            bump = bump.merge(VersionBump::Minor);
        }
    }

    bump
}
