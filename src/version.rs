//! Object versioning
//!
//! Three independent, truncated content hashes compose a version:
//!
//! - **interface** — hash of the canonical interface schema; changes only
//!   when the wire shape changes
//! - **logic** — hash of the implementation's normalized source and
//!   dependency closure; producing that closure is the caller's job, this
//!   module only fingerprints the opaque string
//! - **state** — hash of the JSON encoding of an instance's current field
//!   values, distinguishing two otherwise-identical deployments
//!
//! Truncation to a few hex characters trades collision risk for short,
//! human-legible version strings.

use std::fmt;

use semver::Version as SemVersion;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::encode;
use crate::compatibility::VersionBump;
use crate::descriptor::TypeDescriptor;
use crate::error::{Result, WireError};
use crate::schema::InterfaceSchema;
use crate::value::Value;

/// Hex characters kept of each content hash
pub const VERSION_HASH_LENGTH: usize = 5;

/// A truncated SHA256 content hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of_bytes(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let hex = format!("{:x}", digest);
        Self(hex[..VERSION_HASH_LENGTH].to_string())
    }

    pub fn of_text(content: &str) -> Self {
        Self::of_bytes(content.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash the interface's wire shape
pub fn interface_hash(schema: &InterfaceSchema) -> ContentHash {
    ContentHash::of_text(&schema.canonical_json())
}

/// Hash the implementation's normalized source/dependency closure
pub fn logic_hash(source_closure: &str) -> ContentHash {
    ContentHash::of_text(source_closure)
}

/// Hash an instance's current field values
///
/// Fields are taken in name order and each one is JSON-encoded through the
/// codec, so the hash only moves when encoded state actually changes. Fields
/// absent from the instance are skipped.
pub fn state_hash(instance: &Value, descriptor: &TypeDescriptor) -> Result<ContentHash> {
    let TypeDescriptor::RecordOf { fields, .. } = descriptor else {
        return Err(WireError::UnsupportedDescriptor(format!(
            "state hash needs a record descriptor, got {}",
            descriptor.kind_name()
        )));
    };
    let Value::Rec(map) = instance else {
        return Err(WireError::TypeMismatch {
            expected: descriptor.kind_name(),
            actual: instance.kind_name().to_string(),
        });
    };

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut content = String::from("0");
    for field in sorted {
        if let Some(value) = map.get(&field.name) {
            let encoded = encode(value, &field.descriptor)?;
            content.push_str(&encoded.canonical_json());
        }
    }

    Ok(ContentHash::of_text(&content))
}

/// A three-part object version: `{interface}[-{logic}[-{state}]]`
///
/// A bare interface version omits logic and state, an object version carries
/// interface plus logic, an instance version carries all three.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectVersion {
    /// Version of the wire shape, from the interface schema
    pub interface: String,
    /// Version of the implementation and its dependencies
    pub logic: Option<String>,
    /// Version of the instance's accumulated state
    pub state: Option<String>,
}

impl ObjectVersion {
    pub fn interface_only(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            logic: None,
            state: None,
        }
    }

    pub fn object(interface: impl Into<String>, logic: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            logic: Some(logic.into()),
            state: None,
        }
    }

    pub fn instance(
        interface: impl Into<String>,
        logic: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            interface: interface.into(),
            logic: Some(logic.into()),
            state: Some(state.into()),
        }
    }

    /// Parse a version string
    ///
    /// Accepts the dash form with one to three segments, or the dotted
    /// `vMAJOR.MINOR.PATCH` form when the segments happen to be small
    /// integers. Pre-release and build metadata have no place in either
    /// form and are rejected rather than dropped.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(WireError::InvalidVersion("empty version string".to_string()));
        }

        if let Some(rest) = s.strip_prefix('v') {
            if let Ok(info) = SemVersion::parse(rest) {
                if !info.pre.is_empty() || !info.build.is_empty() {
                    return Err(WireError::InvalidVersion(format!(
                        "version '{}' carries pre-release or build metadata",
                        s
                    )));
                }
                return Ok(Self::instance(
                    info.major.to_string(),
                    info.minor.to_string(),
                    info.patch.to_string(),
                ));
            }
        }

        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(WireError::InvalidVersion(format!(
                "version '{}' is an unexpected form",
                s
            )));
        }

        Ok(Self {
            interface: parts[0].to_string(),
            logic: parts.get(1).map(|p| p.to_string()),
            state: parts.get(2).map(|p| p.to_string()),
        })
    }

    /// Whether the segments spell a dotted semantic version
    pub fn is_semver(&self) -> bool {
        match (&self.logic, &self.state) {
            (Some(logic), Some(state)) => {
                SemVersion::parse(&format!("{}.{}.{}", self.interface, logic, state)).is_ok()
            }
            _ => false,
        }
    }

    /// Compatibility: equal interface hash, with logic and state only
    /// constrained when the given version supplies them.
    pub fn satisfies(&self, constraint: &ObjectVersion) -> bool {
        if self.interface != constraint.interface {
            return false;
        }
        if let Some(logic) = &constraint.logic {
            if self.logic.as_deref() != Some(logic.as_str()) {
                return false;
            }
        }
        if let Some(state) = &constraint.state {
            if self.state.as_deref() != Some(state.as_str()) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for ObjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_semver() {
            return write!(
                f,
                "v{}.{}.{}",
                self.interface,
                self.logic.as_deref().unwrap_or_default(),
                self.state.as_deref().unwrap_or_default()
            );
        }
        write!(f, "{}", self.interface)?;
        if let Some(logic) = &self.logic {
            write!(f, "-{}", logic)?;
        }
        if let Some(state) = &self.state {
            write!(f, "-{}", state)?;
        }
        Ok(())
    }
}

/// Build the object version for an interface plus its implementation closure
pub fn object_version(schema: &InterfaceSchema, source_closure: &str) -> ObjectVersion {
    ObjectVersion::object(
        interface_hash(schema).as_str(),
        logic_hash(source_closure).as_str(),
    )
}

/// Build the full instance version: interface, logic, and current state
pub fn instance_version(
    schema: &InterfaceSchema,
    source_closure: &str,
    instance: &Value,
    descriptor: &TypeDescriptor,
) -> Result<ObjectVersion> {
    Ok(ObjectVersion::instance(
        interface_hash(schema).as_str(),
        logic_hash(source_closure).as_str(),
        state_hash(instance, descriptor)?.as_str(),
    ))
}

/// Apply a bump to a dotted semantic version string
pub fn bump_version(version: &str, bump: VersionBump) -> Result<String> {
    let stripped = version.strip_prefix('v').unwrap_or(version);
    let mut info = SemVersion::parse(stripped)?;

    match bump {
        VersionBump::None => return Ok(version.to_string()),
        VersionBump::Patch => info.patch += 1,
        VersionBump::Minor => {
            info.minor += 1;
            info.patch = 0;
        }
        VersionBump::Major => {
            info.major += 1;
            info.minor = 0;
            info.patch = 0;
        }
    }
    info.pre = semver::Prerelease::EMPTY;
    info.build = semver::BuildMetadata::EMPTY;

    Ok(format!("v{}", info))
}
