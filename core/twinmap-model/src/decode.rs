//! Property bag + relationships → typed object.

use serde_json::Value;

use crate::error::{MappingError, MappingResult};
use crate::scalar::decode_scalar;
use crate::schema::{FieldAccess, TwinSchema, TwinType};
use crate::twin::{PropertyBag, RelationshipDescriptor, Twin};

/// Decode a top-level twin type.
///
/// `twin_id` populates the identifier field, if one is declared; it is never
/// read from the bag. Fails with `UnknownType` if `T` has no model id.
pub fn decode<T: TwinType>(
    bag: &PropertyBag,
    twin_id: Option<&str>,
    relationships: &[RelationshipDescriptor],
) -> MappingResult<T> {
    T::schema()?.decode(bag, twin_id, relationships)
}

/// Decode a stored twin together with its outgoing relationships.
pub fn from_twin<T: TwinType>(
    twin: &Twin,
    relationships: &[RelationshipDescriptor],
) -> MappingResult<T> {
    T::schema()?.from_twin(twin, relationships)
}

/// Decoding against an already built schema, for callers mapping many values
/// of one type.
impl<T: TwinType> TwinSchema<T> {
    /// Same as [`decode()`].
    pub fn decode(
        &self,
        bag: &PropertyBag,
        twin_id: Option<&str>,
        relationships: &[RelationshipDescriptor],
    ) -> MappingResult<T> {
        if !self.has_model() {
            return Err(MappingError::UnknownType(self.type_name().to_string()));
        }
        let mut value = decode_with(self, bag, relationships)?;
        if let Some(id) = twin_id {
            self.set_identifier(&mut value, id);
        }
        Ok(value)
    }

    /// Same as [`from_twin`].
    pub fn from_twin(
        &self,
        twin: &Twin,
        relationships: &[RelationshipDescriptor],
    ) -> MappingResult<T> {
        self.decode(&twin.contents, Some(&twin.id), relationships)
    }
}

/// Decode any mapped type. This is the recursive worker used for nested
/// objects and components; the same relationship list is handed down so
/// relationship fields inside components are populated too.
pub fn decode_contents<T: TwinType>(
    bag: &PropertyBag,
    relationships: &[RelationshipDescriptor],
) -> MappingResult<T> {
    let schema = T::schema()?;
    decode_with(&schema, bag, relationships)
}

fn decode_with<T: Default>(
    schema: &TwinSchema<T>,
    bag: &PropertyBag,
    relationships: &[RelationshipDescriptor],
) -> MappingResult<T> {
    let mut value = T::default();
    for field in schema.fields() {
        match &field.access {
            FieldAccess::Identifier { .. } => {}
            FieldAccess::Property { .. } => {
                decode_property(field.content_name(), &field.access, &mut value, bag)?
            }
            FieldAccess::Nested { decode, .. } => match present(bag, field.content_name()) {
                None => {}
                Some(Value::Object(nested)) => decode(&mut value, nested, relationships)?,
                Some(other) => {
                    return Err(MappingError::type_mismatch(
                        format!("object for {}", field.content_name()),
                        other.to_string(),
                    ));
                }
            },
            FieldAccess::Relationship { decode, .. } => decode(&mut value, relationships)?,
        }
    }
    Ok(value)
}

/// Decode only the property-kind fields found in `bag`.
pub(crate) fn decode_properties<T: Default>(
    schema: &TwinSchema<T>,
    bag: &PropertyBag,
) -> MappingResult<T> {
    let mut value = T::default();
    for field in schema.fields() {
        decode_property(field.content_name(), &field.access, &mut value, bag)?;
    }
    Ok(value)
}

fn decode_property<T>(
    content_name: &str,
    access: &FieldAccess<T>,
    value: &mut T,
    bag: &PropertyBag,
) -> MappingResult<()> {
    let FieldAccess::Property {
        scalar_type, set, ..
    } = access
    else {
        return Ok(());
    };
    match present(bag, content_name) {
        Some(wire) => set(value, decode_scalar(wire, scalar_type)?),
        None => Ok(()),
    }
}

/// A key holding JSON `null` counts as absent.
fn present<'a>(bag: &'a PropertyBag, content_name: &str) -> Option<&'a Value> {
    bag.get(content_name).filter(|v| !v.is_null())
}
