//! Typed object → property bag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MappingError, MappingResult};
use crate::scalar::encode_scalar;
use crate::schema::{ContentKind, FieldAccess, FieldDeclaration, TwinSchema, TwinType};
use crate::twin::{COMPONENT_METADATA_KEY, PropertyBag, RelationshipDescriptor, Twin};

/// What to write for a property whose value is absent.
///
/// Both modes run through the same encoder; only the handling of absent
/// scalars differs. Absent objects are omitted in either mode and absent
/// components are always an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeMode {
    /// Omit the key (default).
    #[default]
    Sparse,
    /// Write the declared type's zero value, so the twin starts with every
    /// property populated.
    Canonical,
}

/// Encode a top-level twin type. Fails with `MissingModelDeclaration` if the
/// type has no model id.
pub fn encode<T: TwinType>(value: &T, mode: EncodeMode) -> MappingResult<PropertyBag> {
    let schema = T::schema()?;
    schema.model_id()?;
    encode_with(&schema, value, mode)
}

/// Encode any mapped type, with or without a model declaration. This is the
/// recursive worker used for nested objects and components.
pub fn encode_contents<T: TwinType>(value: &T, mode: EncodeMode) -> MappingResult<PropertyBag> {
    let schema = T::schema()?;
    encode_with(&schema, value, mode)
}

/// Encode a value as a complete twin: external id from the identifier field,
/// model id from the type declaration, contents from [`encode`].
pub fn to_twin<T: TwinType>(value: &T, mode: EncodeMode) -> MappingResult<Twin> {
    T::schema()?.to_twin(value, mode)
}

/// Collect the relationship-field instances of `value` as descriptors with
/// `source_id` as their source, in field then collection order.
pub fn relationships_of<T: TwinType>(
    value: &T,
    source_id: &str,
) -> MappingResult<Vec<RelationshipDescriptor>> {
    T::schema()?.relationships_of(value, source_id)
}

/// Encoding against an already built schema, for callers mapping many values
/// of one type.
impl<T: TwinType> TwinSchema<T> {
    /// Same as [`to_twin`].
    pub fn to_twin(&self, value: &T, mode: EncodeMode) -> MappingResult<Twin> {
        let model_id = self.model_id()?.to_owned();
        let id = self
            .identifier_of(value)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MappingError::MissingIdentifier {
                type_name: self.type_name().to_string(),
            })?;
        let contents = encode_with(self, value, mode)?;
        Ok(Twin::new(id, model_id, contents))
    }

    /// Same as [`relationships_of`].
    pub fn relationships_of(
        &self,
        value: &T,
        source_id: &str,
    ) -> MappingResult<Vec<RelationshipDescriptor>> {
        let mut out = Vec::new();
        for field in self.fields() {
            if let FieldAccess::Relationship { encode, .. } = &field.access {
                out.extend(encode(value, source_id)?);
            }
        }
        Ok(out)
    }
}

fn encode_with<T>(schema: &TwinSchema<T>, value: &T, mode: EncodeMode) -> MappingResult<PropertyBag> {
    let mut bag = PropertyBag::new();
    for field in schema.fields() {
        match &field.access {
            // Carried out-of-band as the twin id.
            FieldAccess::Identifier { .. } => {}
            // Persisted as separate edges.
            FieldAccess::Relationship { .. } => {}
            FieldAccess::Property { .. } => encode_property(field, value, mode, &mut bag)?,
            FieldAccess::Nested { encode, .. } => match (encode(value, mode)?, field.kind()) {
                (Some(mut nested), ContentKind::Component) => {
                    nested.insert(
                        COMPONENT_METADATA_KEY.to_string(),
                        Value::Object(PropertyBag::new()),
                    );
                    bag.insert(field.content_name().to_string(), Value::Object(nested));
                }
                (Some(nested), _) => {
                    bag.insert(field.content_name().to_string(), Value::Object(nested));
                }
                (None, ContentKind::Component) => {
                    return Err(MappingError::NullComponent(field.content_name().to_string()));
                }
                (None, _) => {}
            },
        }
    }
    Ok(bag)
}

/// Encode only the property-kind fields of `value`. Relationship instances
/// carry nothing else.
pub(crate) fn encode_properties<T>(
    schema: &TwinSchema<T>,
    value: &T,
    mode: EncodeMode,
) -> MappingResult<PropertyBag> {
    let mut bag = PropertyBag::new();
    for field in schema.fields() {
        encode_property(field, value, mode, &mut bag)?;
    }
    Ok(bag)
}

fn encode_property<T>(
    field: &FieldDeclaration<T>,
    value: &T,
    mode: EncodeMode,
    bag: &mut PropertyBag,
) -> MappingResult<()> {
    let FieldAccess::Property {
        scalar_type, get, ..
    } = &field.access
    else {
        return Ok(());
    };
    let scalar = match (get(value), mode) {
        (Some(scalar), _) => scalar,
        (None, EncodeMode::Sparse) => return Ok(()),
        (None, EncodeMode::Canonical) => scalar_type.zero_value()?,
    };
    bag.insert(
        field.content_name().to_string(),
        encode_scalar(&scalar, scalar_type)?,
    );
    Ok(())
}
