mod common;

use common::{Employee, Friendship, PERSON_MODEL, Person, Unregistered};
use twinmap_model::{
    ContentKind, DeclaredType, IDENTIFIER_CONTENT_NAME, MappingError, MappingResult, ScalarType,
    TwinRelationship, TwinSchema, TwinType,
};

// ── Classification ───────────────────────────────────────────────

#[test]
fn person_fields_in_registration_order() {
    let schema = Person::schema().unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.content_name()).collect();
    assert_eq!(
        names,
        vec![
            IDENTIFIER_CONTENT_NAME,
            "createdBy",
            "name",
            "hasDriversLicence",
            "birthDate",
            "carCount",
            "highScore",
            "timeSpentLookingAtCatVideos",
            "height",
            "gender",
            "geoLocation",
            "contactInfo",
            "knows",
        ]
    );
}

#[test]
fn person_field_kinds() {
    let schema = Person::schema().unwrap();
    let kind = |name: &str| schema.field(name).unwrap().kind();
    assert_eq!(kind(IDENTIFIER_CONTENT_NAME), ContentKind::Identifier);
    assert_eq!(kind("name"), ContentKind::Property);
    assert_eq!(kind("gender"), ContentKind::Property);
    assert_eq!(kind("geoLocation"), ContentKind::Object);
    assert_eq!(kind("contactInfo"), ContentKind::Component);
    assert_eq!(kind("knows"), ContentKind::Relationship);
}

#[test]
fn declared_types_follow_rust_field_types() {
    let schema = Person::schema().unwrap();
    let declared = |name: &str| schema.field(name).unwrap().declared_type().clone();
    assert_eq!(declared("name"), DeclaredType::Scalar(ScalarType::String));
    assert_eq!(declared("carCount"), DeclaredType::Scalar(ScalarType::Integer));
    assert_eq!(declared("height"), DeclaredType::Scalar(ScalarType::Double));
    assert_eq!(declared("birthDate"), DeclaredType::Scalar(ScalarType::DateTime));
    assert_eq!(
        declared("timeSpentLookingAtCatVideos"),
        DeclaredType::Scalar(ScalarType::Duration)
    );
    assert_eq!(
        declared("gender"),
        DeclaredType::Scalar(ScalarType::Enum {
            name: "Gender",
            members: &["Female", "Male", "NonBinary"],
        })
    );
    assert_eq!(
        declared("geoLocation"),
        DeclaredType::Nested {
            type_name: "GeoLocation"
        }
    );
    assert_eq!(
        declared("knows"),
        DeclaredType::RelationshipList {
            element: "Friendship",
            relationship_name: "isFriendOf",
        }
    );
}

#[test]
fn unknown_field_lookup_is_none() {
    let schema = Person::schema().unwrap();
    assert!(schema.field("nope").is_none());
}

// ── Model declaration ────────────────────────────────────────────

#[test]
fn model_id_present() {
    let schema = Person::schema().unwrap();
    assert_eq!(schema.model_id().unwrap(), PERSON_MODEL);
    assert!(schema.has_model());
    assert_eq!(schema.type_name(), "Person");
}

#[test]
fn model_id_missing() {
    let schema = Unregistered::schema().unwrap();
    assert!(!schema.has_model());
    assert_eq!(
        schema.model_id(),
        Err(MappingError::MissingModelDeclaration {
            type_name: "Unregistered".into()
        })
    );
}

#[derive(Debug, Default)]
struct EmptyModel;

impl TwinType for EmptyModel {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("").build()
    }
}

#[test]
fn empty_model_id_counts_as_missing() {
    let schema = EmptyModel::schema().unwrap();
    assert!(matches!(
        schema.model_id(),
        Err(MappingError::MissingModelDeclaration { .. })
    ));
}

// ── Identifier ───────────────────────────────────────────────────

#[test]
fn identifier_read_through_schema() {
    let schema = Person::schema().unwrap();
    let person = Person {
        id: "abc".into(),
        ..Default::default()
    };
    assert_eq!(schema.identifier_of(&person), Some("abc".to_string()));
}

#[test]
fn identifier_absent_when_not_declared() {
    let schema = Unregistered::schema().unwrap();
    assert!(schema.identifier().is_none());
    assert_eq!(schema.identifier_of(&Unregistered::default()), None);
}

#[derive(Debug, Default)]
struct TwoIds {
    a: String,
    b: String,
}

impl TwinType for TwoIds {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:TwoIds;1")
            .identifier(|t| t.a.clone(), |t, v| t.a = v)
            .identifier(|t| t.b.clone(), |t, v| t.b = v)
            .build()
    }
}

#[test]
fn second_identifier_rejected() {
    let err = TwoIds::schema().unwrap_err();
    assert_eq!(
        err,
        MappingError::DuplicateIdentifier {
            type_name: "TwoIds".into()
        }
    );
}

// ── Content names ────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Clash {
    a: Option<String>,
    b: Option<i64>,
}

impl TwinType for Clash {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:Clash;1")
            .property("value", |c| c.a.clone(), |c, v| c.a = Some(v))
            .property("value", |c| c.b, |c, v| c.b = Some(v))
            .build()
    }
}

#[test]
fn duplicate_content_name_rejected() {
    let err = Clash::schema().unwrap_err();
    assert_eq!(
        err,
        MappingError::DuplicateContentName {
            type_name: "Clash".into(),
            content_name: "value".into(),
        }
    );
}

#[derive(Debug, Default)]
struct ShadowsMetadata {
    marker: Option<String>,
}

impl TwinType for ShadowsMetadata {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:ShadowsMetadata;1")
            .property("$metadata", |s| s.marker.clone(), |s, v| s.marker = Some(v))
            .build()
    }
}

#[test]
fn metadata_content_name_rejected() {
    let err = ShadowsMetadata::schema().unwrap_err();
    assert_eq!(
        err,
        MappingError::ReservedContentName {
            type_name: "ShadowsMetadata".into(),
            content_name: "$metadata".into(),
        }
    );
}

#[derive(Debug, Default)]
struct ShadowsId {
    other: Option<Point>,
}

#[derive(Debug, Default)]
struct Point {
    x: f64,
}

impl TwinType for Point {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder()
            .property("x", |g| Some(g.x), |g, v| g.x = v)
            .build()
    }
}

impl TwinType for ShadowsId {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:ShadowsId;1")
            .object("$dtId", |s| s.other.as_ref(), |s, v| s.other = Some(v))
            .build()
    }
}

#[test]
fn any_dollar_prefixed_content_name_rejected() {
    let err = ShadowsId::schema().unwrap_err();
    assert!(matches!(
        err,
        MappingError::ReservedContentName { ref content_name, .. } if content_name == "$dtId"
    ));
}

#[test]
fn identifier_keeps_its_reserved_name() {
    let schema = Person::schema().unwrap();
    assert_eq!(
        schema.identifier().unwrap().content_name(),
        IDENTIFIER_CONTENT_NAME
    );
}

// ── Relationship fields ──────────────────────────────────────────

#[test]
fn distinct_relationship_fields_accepted() {
    let schema = Employee::schema().unwrap();
    let kinds: Vec<ContentKind> = schema.fields().iter().map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ContentKind::Identifier,
            ContentKind::Relationship,
            ContentKind::Relationship
        ]
    );
}

#[derive(Debug, Default)]
struct DoubleClaim {
    first: Vec<Friendship>,
    second: Vec<Friendship>,
}

impl TwinType for DoubleClaim {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:DoubleClaim;1")
            .relationships("first", |d| &d.first, |d| &mut d.first)
            .relationships("second", |d| &d.second, |d| &mut d.second)
            .build()
    }
}

#[test]
fn two_fields_claiming_one_relationship_name_rejected() {
    let err = DoubleClaim::schema().unwrap_err();
    assert!(matches!(
        err,
        MappingError::InvalidRelationshipFieldType { ref field, .. } if field == "second"
    ));
}

#[derive(Debug, Default)]
struct Nameless {
    target_id: String,
}

impl TwinType for Nameless {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder().build()
    }
}

impl TwinRelationship for Nameless {
    const RELATIONSHIP_NAME: &'static str = "";

    fn target_id(&self) -> &str {
        &self.target_id
    }

    fn set_target_id(&mut self, target_id: String) {
        self.target_id = target_id;
    }
}

#[derive(Debug, Default)]
struct HoldsNameless {
    links: Vec<Nameless>,
}

impl TwinType for HoldsNameless {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:HoldsNameless;1")
            .relationships("links", |h| &h.links, |h| &mut h.links)
            .build()
    }
}

#[test]
fn relationship_element_without_name_rejected() {
    let err = HoldsNameless::schema().unwrap_err();
    assert!(matches!(
        err,
        MappingError::InvalidRelationshipFieldType { ref field, .. } if field == "links"
    ));
}
