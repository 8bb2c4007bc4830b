//! Relationship codec: typed relationship instance ↔ descriptor.

use crate::decode::decode_properties;
use crate::encode::{EncodeMode, encode_properties};
use crate::error::MappingResult;
use crate::schema::{TwinSchema, TwinType};
use crate::twin::RelationshipDescriptor;

/// A typed outgoing relationship.
///
/// The relationship's own properties are registered through its
/// [`TwinType::schema`]; only property-kind fields are carried. The schema
/// normally uses [`TwinSchema::builder`](crate::TwinSchema::builder), since
/// relationships have no model id of their own.
pub trait TwinRelationship: TwinType {
    /// The relationship name used in the store. Decoding claims exactly the
    /// incoming relationships carrying this name.
    const RELATIONSHIP_NAME: &'static str;

    fn target_id(&self) -> &str;

    fn set_target_id(&mut self, target_id: String);
}

/// The composite key identifying a relationship: `"{source}-{name}->{target}"`.
pub fn relationship_id(source_id: &str, relationship_name: &str, target_id: &str) -> String {
    format!("{source_id}-{relationship_name}->{target_id}")
}

/// Encode a relationship instance as an outgoing edge of `source_id`.
pub fn to_descriptor<R: TwinRelationship>(
    relationship: &R,
    source_id: &str,
) -> MappingResult<RelationshipDescriptor> {
    R::schema()?.to_descriptor(relationship, source_id)
}

/// Rebuild a relationship instance from a stored descriptor.
pub fn from_descriptor<R: TwinRelationship>(
    descriptor: &RelationshipDescriptor,
) -> MappingResult<R> {
    R::schema()?.from_descriptor(descriptor)
}

impl<R: TwinRelationship> TwinSchema<R> {
    /// [`to_descriptor`] against an already built schema.
    pub fn to_descriptor(
        &self,
        relationship: &R,
        source_id: &str,
    ) -> MappingResult<RelationshipDescriptor> {
        let properties = encode_properties(self, relationship, EncodeMode::Sparse)?;
        Ok(RelationshipDescriptor::new(
            source_id,
            R::RELATIONSHIP_NAME,
            relationship.target_id(),
            properties,
        ))
    }

    /// [`from_descriptor`] against an already built schema.
    pub fn from_descriptor(&self, descriptor: &RelationshipDescriptor) -> MappingResult<R> {
        let mut relationship: R = decode_properties(self, &descriptor.properties)?;
        relationship.set_target_id(descriptor.target_id.clone());
        Ok(relationship)
    }
}
