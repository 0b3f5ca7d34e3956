//! Error types for the wire codec and compatibility analyzer

use thiserror::Error;

/// Result type for codec and schema operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Codec and schema analysis errors
///
/// All of these indicate an invalid payload or interface declaration, never a
/// transient fault. The same input always fails the same way, so nothing here
/// is ever retried.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("value did not match any union variant: {0}")]
    NoUnionVariantMatched(String),

    #[error("missing field '{field}' on record '{record}'")]
    MissingField { record: String, field: String },

    #[error("wire shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("unsupported descriptor: {0}")]
    UnsupportedDescriptor(String),

    #[error("unknown schema type: {0}")]
    UnknownSchemaType(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("semver error: {0}")]
    Semver(#[from] semver::Error),
}
