//! Error types for the mapping layer.

use thiserror::Error;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Errors raised while classifying, encoding or decoding a mapped type.
///
/// Every variant is raised at the point of detection; encode and decode never
/// hand back a partially mapped value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A top-level encode was attempted on a type without a model id.
    #[error("type {type_name} has no model declaration")]
    MissingModelDeclaration { type_name: String },

    /// A relationship field does not point at a usable relationship type.
    #[error("invalid relationship field {field}: {reason}")]
    InvalidRelationshipFieldType { field: String, reason: String },

    /// The wire string matches no member of the target enum.
    #[error("unknown member {value:?} for enum {enum_name}")]
    UnknownEnumMember { enum_name: String, value: String },

    /// The wire value cannot be converted to the declared type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A component field was absent on encode.
    #[error("component {0} cannot be null")]
    NullComponent(String),

    /// A top-level decode was attempted on a type without a model id.
    #[error("type {0} has no model declaration and cannot be decoded as a twin")]
    UnknownType(String),

    /// More than one identifier field was registered.
    #[error("type {type_name} declares more than one identifier field")]
    DuplicateIdentifier { type_name: String },

    /// Two fields share a content name.
    #[error("type {type_name} declares content name {content_name:?} twice")]
    DuplicateContentName {
        type_name: String,
        content_name: String,
    },

    /// A field uses a `$`-prefixed content name, which the store reserves
    /// for its own keys.
    #[error("type {type_name} uses reserved content name {content_name:?}")]
    ReservedContentName {
        type_name: String,
        content_name: String,
    },

    /// A twin could not be built because no identifier value is available.
    #[error("no identifier provided for {type_name}")]
    MissingIdentifier { type_name: String },
}

impl MappingError {
    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
