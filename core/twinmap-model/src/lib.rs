//! Bidirectional mapping between typed Rust values and digital twin property
//! bags.
//!
//! The engine is driven by a per-type descriptor table:
//! - [`TwinType`] / [`TwinSchema`]: which fields map to which content names,
//!   and as what [`ContentKind`]
//! - [`encode`] / [`to_twin`]: typed value → [`PropertyBag`]
//! - [`decode`] / [`from_twin`]: [`PropertyBag`] + relationships → typed value
//! - [`TwinRelationship`]: typed edges, stored as separate
//!   [`RelationshipDescriptor`]s keyed by [`relationship_id`]
//!
//! Every transform is a pure function of its input; nothing here talks to a
//! store or holds state.

mod decode;
mod encode;
mod error;
mod relationship;
mod scalar;
mod schema;
mod twin;

pub use decode::{decode, decode_contents, from_twin};
pub use encode::{EncodeMode, encode, encode_contents, relationships_of, to_twin};
pub use error::{MappingError, MappingResult};
pub use relationship::{TwinRelationship, from_descriptor, relationship_id, to_descriptor};
pub use scalar::{
    Scalar, ScalarType, ScalarValue, TwinEnum, decode_scalar, encode_scalar, format_duration,
    parse_duration,
};
pub use schema::{
    ContentKind, DeclaredType, FieldDeclaration, IDENTIFIER_CONTENT_NAME, SchemaBuilder,
    TwinSchema, TwinType,
};
pub use twin::{COMPONENT_METADATA_KEY, PropertyBag, RelationshipDescriptor, Twin, TwinMetadata};
