//! objwire
//!
//! Structural wire codec and schema compatibility analyzer for remoted
//! objects.
//!
//! ## Features
//!
//! - **Untagged wire format**: typed values travel as plain JSON-like
//!   payloads; union variants are re-derived by structural matching
//! - **Deterministic schemas**: interfaces render to sorted, JSON-schema-like
//!   trees that hash identically regardless of declaration order
//! - **Compatibility analysis**: two schema snapshots diff to the smallest
//!   semantic-version bump the change requires (PATCH / MINOR / MAJOR)
//! - **Three-part versions**: interface, logic, and state content hashes
//!   compose a short, human-legible version identifier
//!
//! ## Data flow
//!
//! ```text
//! application type
//!   └── TypeDescriptor (built once, ahead of use)
//!         ├── codec          encode/decode runtime traffic
//!         └── schema builder InterfaceSchema
//!               ├── version hasher  {interface}-{logic}-{state}
//!               └── compatibility   diff(old, new) -> VersionBump
//! ```
//!
//! Everything here is a pure function over immutable inputs; the only shared
//! mutable piece is the [`SchemaCache`], which is safe to read concurrently.

pub mod cache;
pub mod codec;
pub mod compatibility;
pub mod descriptor;
pub mod error;
pub mod matcher;
pub mod schema;
pub mod value;
pub mod version;

pub use cache::SchemaCache;
pub use codec::{decode, encode};
pub use compatibility::{diff_interface, diff_schema, VersionBump};
pub use descriptor::{
    EnumMember, FieldDescriptor, InterfaceDescriptor, OperationDescriptor, ParamDescriptor,
    PrimitiveKind, TypeDescriptor,
};
pub use error::{Result, WireError};
pub use matcher::matches;
pub use schema::{
    build_interface_schema, build_schema, InterfaceSchema, OperationSchema, SchemaKind, SchemaNode,
};
pub use value::Value;
pub use version::{
    bump_version, instance_version, interface_hash, logic_hash, object_version, state_hash,
    ContentHash, ObjectVersion, VERSION_HASH_LENGTH,
};
