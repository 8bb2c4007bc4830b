//! Field classification model.
//!
//! Each mapped type registers an explicit descriptor table: one
//! [`FieldDeclaration`] per mapped field, carrying its content name, its
//! [`ContentKind`] and the accessors the encoder and decoder drive. Nested and
//! relationship element types are captured as generic parameters at
//! registration time, so no runtime type lookup happens during a transform.

use std::any::type_name;
use std::collections::HashSet;
use std::fmt;

use crate::decode::decode_contents;
use crate::encode::{EncodeMode, encode_contents};
use crate::error::{MappingError, MappingResult};
use crate::relationship::TwinRelationship;
use crate::scalar::{Scalar, ScalarType, ScalarValue, TwinEnum};
use crate::twin::{PropertyBag, RelationshipDescriptor};

/// Content name reported for the identifier field. The identifier never
/// appears inside a bag; it travels as the twin's external id.
pub const IDENTIFIER_CONTENT_NAME: &str = "$dtId";

/// A Rust type that can be mapped to and from a property bag.
///
/// `Default` supplies the zero-valued instance the decoder fills in.
pub trait TwinType: Default + 'static {
    fn schema() -> MappingResult<TwinSchema<Self>>;
}

/// How a field is represented in the twin store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// The twin's external id.
    Identifier,
    /// A scalar or enum value.
    Property,
    /// A nested value aggregate, optional.
    Object,
    /// An embedded sub-entity, required, tagged with the metadata marker.
    Component,
    /// A collection of outgoing relationships, stored as separate edges.
    Relationship,
}

/// The static type behind a field, as far as the mapping cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Identifier,
    Scalar(ScalarType),
    Nested {
        type_name: &'static str,
    },
    RelationshipList {
        element: &'static str,
        relationship_name: &'static str,
    },
}

type IdGetter<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type IdSetter<T> = Box<dyn Fn(&mut T, String) + Send + Sync>;
type ScalarGetter<T> = Box<dyn Fn(&T) -> Option<ScalarValue> + Send + Sync>;
type ScalarSetter<T> = Box<dyn Fn(&mut T, ScalarValue) -> MappingResult<()> + Send + Sync>;
type NestedEncoder<T> =
    Box<dyn Fn(&T, EncodeMode) -> MappingResult<Option<PropertyBag>> + Send + Sync>;
type NestedDecoder<T> = Box<
    dyn Fn(&mut T, &PropertyBag, &[RelationshipDescriptor]) -> MappingResult<()> + Send + Sync,
>;
type RelationshipEncoder<T> =
    Box<dyn Fn(&T, &str) -> MappingResult<Vec<RelationshipDescriptor>> + Send + Sync>;
type RelationshipDecoder<T> =
    Box<dyn Fn(&mut T, &[RelationshipDescriptor]) -> MappingResult<()> + Send + Sync>;

pub(crate) enum FieldAccess<T> {
    Identifier {
        get: IdGetter<T>,
        set: IdSetter<T>,
    },
    Property {
        scalar_type: ScalarType,
        get: ScalarGetter<T>,
        set: ScalarSetter<T>,
    },
    Nested {
        encode: NestedEncoder<T>,
        decode: NestedDecoder<T>,
    },
    Relationship {
        encode: RelationshipEncoder<T>,
        decode: RelationshipDecoder<T>,
    },
}

/// One registered field of a mapped type.
pub struct FieldDeclaration<T> {
    content_name: String,
    kind: ContentKind,
    declared_type: DeclaredType,
    pub(crate) access: FieldAccess<T>,
}

impl<T> FieldDeclaration<T> {
    pub fn content_name(&self) -> &str {
        &self.content_name
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }
}

impl<T> fmt::Debug for FieldDeclaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDeclaration")
            .field("content_name", &self.content_name)
            .field("kind", &self.kind)
            .field("declared_type", &self.declared_type)
            .finish()
    }
}

/// The validated descriptor table of a mapped type.
///
/// Building one allocates every accessor, so callers mapping many values of
/// one type build it once and reuse it. Schemas are `Send + Sync`.
#[derive(Debug)]
pub struct TwinSchema<T> {
    type_name: &'static str,
    model_id: Option<String>,
    fields: Vec<FieldDeclaration<T>>,
}

impl<T: 'static> TwinSchema<T> {
    /// Starts a schema for a top-level twin type with the given model id.
    pub fn model(model_id: impl Into<String>) -> SchemaBuilder<T> {
        SchemaBuilder {
            model_id: Some(model_id.into()),
            fields: Vec::new(),
        }
    }

    /// Starts a schema for a type that is only ever nested (objects,
    /// components) or used as a relationship.
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            model_id: None,
            fields: Vec::new(),
        }
    }
}

impl<T> TwinSchema<T> {
    /// Short Rust type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The model id, or `MissingModelDeclaration` if none (or an empty one)
    /// was declared.
    pub fn model_id(&self) -> MappingResult<&str> {
        self.model_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MappingError::MissingModelDeclaration {
                type_name: self.type_name.to_string(),
            })
    }

    pub fn has_model(&self) -> bool {
        self.model_id().is_ok()
    }

    /// Declarations in registration order.
    pub fn fields(&self) -> &[FieldDeclaration<T>] {
        &self.fields
    }

    pub fn field(&self, content_name: &str) -> Option<&FieldDeclaration<T>> {
        self.fields.iter().find(|f| f.content_name == content_name)
    }

    pub fn identifier(&self) -> Option<&FieldDeclaration<T>> {
        self.fields
            .iter()
            .find(|f| f.kind == ContentKind::Identifier)
    }

    /// Reads the identifier value of `value`, if an identifier is declared.
    pub fn identifier_of(&self, value: &T) -> Option<String> {
        match self.identifier().map(|f| &f.access) {
            Some(FieldAccess::Identifier { get, .. }) => Some(get(value)),
            _ => None,
        }
    }

    pub(crate) fn set_identifier(&self, value: &mut T, id: &str) {
        if let Some(FieldAccess::Identifier { set, .. }) = self.identifier().map(|f| &f.access) {
            set(value, id.to_owned());
        }
    }
}

/// Registers the fields of a mapped type, one method per content kind.
///
/// ```
/// use twinmap_model::{MappingResult, TwinSchema, TwinType};
///
/// #[derive(Debug, Default)]
/// struct Room {
///     id: String,
///     name: Option<String>,
///     seats: i32,
/// }
///
/// impl TwinType for Room {
///     fn schema() -> MappingResult<TwinSchema<Self>> {
///         TwinSchema::<Self>::model("dtmi:example:Room;1")
///             .identifier(|r| r.id.clone(), |r, id| r.id = id)
///             .property("name", |r| r.name.clone(), |r, v| r.name = Some(v))
///             .property("seats", |r| Some(r.seats), |r, v| r.seats = v)
///             .build()
///     }
/// }
///
/// let schema = Room::schema().unwrap();
/// assert_eq!(schema.model_id().unwrap(), "dtmi:example:Room;1");
/// assert_eq!(schema.fields().len(), 3);
/// ```
pub struct SchemaBuilder<T> {
    model_id: Option<String>,
    fields: Vec<FieldDeclaration<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    fn push(
        mut self,
        content_name: String,
        kind: ContentKind,
        declared_type: DeclaredType,
        access: FieldAccess<T>,
    ) -> Self {
        self.fields.push(FieldDeclaration {
            content_name,
            kind,
            declared_type,
            access,
        });
        self
    }

    /// The field holding the twin's external id.
    pub fn identifier<G, S>(self, get: G, set: S) -> Self
    where
        G: Fn(&T) -> String + Send + Sync + 'static,
        S: Fn(&mut T, String) + Send + Sync + 'static,
    {
        self.push(
            IDENTIFIER_CONTENT_NAME.to_string(),
            ContentKind::Identifier,
            DeclaredType::Identifier,
            FieldAccess::Identifier {
                get: Box::new(get),
                set: Box::new(set),
            },
        )
    }

    /// A scalar property. `get` returns `None` for an absent value.
    pub fn property<V, G, S>(self, content_name: impl Into<String>, get: G, set: S) -> Self
    where
        V: Scalar + 'static,
        G: Fn(&T) -> Option<V> + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let scalar_type = V::scalar_type();
        self.push(
            content_name.into(),
            ContentKind::Property,
            DeclaredType::Scalar(scalar_type),
            FieldAccess::Property {
                scalar_type,
                get: Box::new(move |value: &T| get(value).map(V::into_scalar)),
                set: Box::new(move |value: &mut T, scalar: ScalarValue| -> MappingResult<()> {
                    set(value, V::from_scalar(scalar)?);
                    Ok(())
                }),
            },
        )
    }

    /// An enum property, stored by member name.
    pub fn enumeration<E, G, S>(self, content_name: impl Into<String>, get: G, set: S) -> Self
    where
        E: TwinEnum,
        G: Fn(&T) -> Option<E> + Send + Sync + 'static,
        S: Fn(&mut T, E) + Send + Sync + 'static,
    {
        let enum_name = short_type_name::<E>();
        let scalar_type = ScalarType::Enum {
            name: enum_name,
            members: E::MEMBERS,
        };
        self.push(
            content_name.into(),
            ContentKind::Property,
            DeclaredType::Scalar(scalar_type),
            FieldAccess::Property {
                scalar_type,
                get: Box::new(move |value: &T| {
                    get(value).map(|member| ScalarValue::Enum(member.name().to_owned()))
                }),
                set: Box::new(move |value: &mut T, scalar: ScalarValue| -> MappingResult<()> {
                    match scalar {
                        ScalarValue::Enum(name) => {
                            let member =
                                E::from_name(&name).ok_or(MappingError::UnknownEnumMember {
                                    enum_name: enum_name.to_string(),
                                    value: name,
                                })?;
                            set(value, member);
                            Ok(())
                        }
                        other => Err(MappingError::type_mismatch(
                            scalar_type.to_string(),
                            format!("{other:?}"),
                        )),
                    }
                }),
            },
        )
    }

    /// A nested value aggregate. Omitted from the bag when `get` returns `None`.
    pub fn object<U, G, S>(self, content_name: impl Into<String>, get: G, set: S) -> Self
    where
        U: TwinType,
        G: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
        S: Fn(&mut T, U) + Send + Sync + 'static,
    {
        self.nested(content_name.into(), ContentKind::Object, get, set)
    }

    /// An embedded component. Encoding fails with `NullComponent` when `get`
    /// returns `None`.
    pub fn component<U, G, S>(self, content_name: impl Into<String>, get: G, set: S) -> Self
    where
        U: TwinType,
        G: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
        S: Fn(&mut T, U) + Send + Sync + 'static,
    {
        self.nested(content_name.into(), ContentKind::Component, get, set)
    }

    fn nested<U, G, S>(self, content_name: String, kind: ContentKind, get: G, set: S) -> Self
    where
        U: TwinType,
        G: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
        S: Fn(&mut T, U) + Send + Sync + 'static,
    {
        self.push(
            content_name,
            kind,
            DeclaredType::Nested {
                type_name: short_type_name::<U>(),
            },
            FieldAccess::Nested {
                encode: Box::new(move |value: &T, mode: EncodeMode| {
                    get(value)
                        .map(|nested| encode_contents(nested, mode))
                        .transpose()
                }),
                decode: Box::new(
                    move |value: &mut T,
                          bag: &PropertyBag,
                          relationships: &[RelationshipDescriptor]|
                          -> MappingResult<()> {
                        set(value, decode_contents::<U>(bag, relationships)?);
                        Ok(())
                    },
                ),
            },
        )
    }

    /// A collection of outgoing relationships of one relationship type.
    ///
    /// On decode the collection is always reset to empty, then filled with
    /// every incoming relationship whose name is `R::RELATIONSHIP_NAME`.
    pub fn relationships<R, G, M>(self, content_name: impl Into<String>, get: G, get_mut: M) -> Self
    where
        R: TwinRelationship,
        G: for<'a> Fn(&'a T) -> &'a Vec<R> + Send + Sync + 'static,
        M: for<'a> Fn(&'a mut T) -> &'a mut Vec<R> + Send + Sync + 'static,
    {
        self.push(
            content_name.into(),
            ContentKind::Relationship,
            DeclaredType::RelationshipList {
                element: short_type_name::<R>(),
                relationship_name: R::RELATIONSHIP_NAME,
            },
            FieldAccess::Relationship {
                encode: Box::new(
                    move |value: &T,
                          source_id: &str|
                          -> MappingResult<Vec<RelationshipDescriptor>> {
                        let list = get(value);
                        if list.is_empty() {
                            return Ok(Vec::new());
                        }
                        let schema = R::schema()?;
                        list.iter()
                            .map(|relationship| schema.to_descriptor(relationship, source_id))
                            .collect()
                    },
                ),
                decode: Box::new(
                    move |value: &mut T,
                          relationships: &[RelationshipDescriptor]|
                          -> MappingResult<()> {
                        let list = get_mut(value);
                        list.clear();
                        let mut matching = relationships
                            .iter()
                            .filter(|d| d.relationship_name == R::RELATIONSHIP_NAME)
                            .peekable();
                        if matching.peek().is_none() {
                            return Ok(());
                        }
                        let schema = R::schema()?;
                        for descriptor in matching {
                            list.push(schema.from_descriptor(descriptor)?);
                        }
                        Ok(())
                    },
                ),
            },
        )
    }

    /// Validates the table and produces the schema.
    pub fn build(self) -> MappingResult<TwinSchema<T>> {
        let type_name = short_type_name::<T>();

        let identifiers = self
            .fields
            .iter()
            .filter(|f| f.kind == ContentKind::Identifier)
            .count();
        if identifiers > 1 {
            return Err(MappingError::DuplicateIdentifier {
                type_name: type_name.to_string(),
            });
        }

        let mut content_names = HashSet::new();
        let mut relationship_names = HashSet::new();
        for field in &self.fields {
            if field.kind != ContentKind::Identifier && field.content_name.starts_with('$') {
                return Err(MappingError::ReservedContentName {
                    type_name: type_name.to_string(),
                    content_name: field.content_name.clone(),
                });
            }
            if !content_names.insert(field.content_name.as_str()) {
                return Err(MappingError::DuplicateContentName {
                    type_name: type_name.to_string(),
                    content_name: field.content_name.clone(),
                });
            }
            if let DeclaredType::RelationshipList {
                element,
                relationship_name,
            } = &field.declared_type
            {
                if relationship_name.is_empty() {
                    return Err(MappingError::InvalidRelationshipFieldType {
                        field: field.content_name.clone(),
                        reason: format!("element type {element} has an empty relationship name"),
                    });
                }
                if !relationship_names.insert(*relationship_name) {
                    return Err(MappingError::InvalidRelationshipFieldType {
                        field: field.content_name.clone(),
                        reason: format!(
                            "relationship name {relationship_name:?} is already claimed by another field"
                        ),
                    });
                }
            }
        }

        Ok(TwinSchema {
            type_name,
            model_id: self.model_id,
            fields: self.fields,
        })
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
