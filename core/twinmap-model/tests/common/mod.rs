#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeDelta};
use twinmap_model::{MappingResult, TwinRelationship, TwinSchema, TwinType, twin_enum};

pub const PERSON_MODEL: &str = "dtmi:test:TestPerson;1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Female,
    Male,
    NonBinary,
}

twin_enum!(Gender { Female, Male, NonBinary });

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl TwinType for GeoLocation {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder()
            .property("latitude", |g| Some(g.latitude), |g, v| g.latitude = v)
            .property("longitude", |g| Some(g.longitude), |g, v| g.longitude = v)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactInfo {
    pub email: Option<String>,
}

impl TwinType for ContactInfo {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:TestContactInfo;1")
            .property("email", |c| c.email.clone(), |c, v| c.email = Some(v))
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Friendship {
    pub target_id: String,
    pub comment: Option<String>,
}

impl TwinType for Friendship {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder()
            .property("comment", |f| f.comment.clone(), |f, v| f.comment = Some(v))
            .build()
    }
}

impl TwinRelationship for Friendship {
    const RELATIONSHIP_NAME: &'static str = "isFriendOf";

    fn target_id(&self) -> &str {
        &self.target_id
    }

    fn set_target_id(&mut self, target_id: String) {
        self.target_id = target_id;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colleague {
    pub target_id: String,
    pub since_year: Option<i32>,
}

impl TwinType for Colleague {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder()
            .property("sinceYear", |c| c.since_year, |c, v| c.since_year = Some(v))
            .build()
    }
}

impl TwinRelationship for Colleague {
    const RELATIONSHIP_NAME: &'static str = "worksWith";

    fn target_id(&self) -> &str {
        &self.target_id
    }

    fn set_target_id(&mut self, target_id: String) {
        self.target_id = target_id;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub id: String,
    pub created_by: Option<String>,
    pub name: Option<String>,
    pub has_drivers_licence: bool,
    pub birth_date: Option<DateTime<FixedOffset>>,
    pub car_count: i32,
    pub high_score: f64,
    pub time_spent_looking_at_cat_videos: Option<TimeDelta>,
    pub height: f64,
    pub gender: Gender,
    pub geo_location: Option<GeoLocation>,
    pub contact_info: Option<ContactInfo>,
    pub friendships: Vec<Friendship>,
}

impl TwinType for Person {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model(PERSON_MODEL)
            .identifier(|p| p.id.clone(), |p, id| p.id = id)
            .property("createdBy", |p| p.created_by.clone(), |p, v| p.created_by = Some(v))
            .property("name", |p| p.name.clone(), |p, v| p.name = Some(v))
            .property(
                "hasDriversLicence",
                |p| Some(p.has_drivers_licence),
                |p, v| p.has_drivers_licence = v,
            )
            .property("birthDate", |p| p.birth_date, |p, v| p.birth_date = Some(v))
            .property("carCount", |p| Some(p.car_count), |p, v| p.car_count = v)
            .property("highScore", |p| Some(p.high_score), |p, v| p.high_score = v)
            .property(
                "timeSpentLookingAtCatVideos",
                |p| p.time_spent_looking_at_cat_videos,
                |p, v| p.time_spent_looking_at_cat_videos = Some(v),
            )
            .property("height", |p| Some(p.height), |p, v| p.height = v)
            .enumeration("gender", |p| Some(p.gender), |p, v| p.gender = v)
            .object("geoLocation", |p| p.geo_location.as_ref(), |p, v| p.geo_location = Some(v))
            .component("contactInfo", |p| p.contact_info.as_ref(), |p, v| p.contact_info = Some(v))
            .relationships("knows", |p| &p.friendships, |p| &mut p.friendships)
            .build()
    }
}

/// Like `Person`, but with a second relationship field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Employee {
    pub id: String,
    pub friendships: Vec<Friendship>,
    pub colleagues: Vec<Colleague>,
}

impl TwinType for Employee {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:Employee;1")
            .identifier(|e| e.id.clone(), |e, id| e.id = id)
            .relationships("knows", |e| &e.friendships, |e| &mut e.friendships)
            .relationships("colleagues", |e| &e.colleagues, |e| &mut e.colleagues)
            .build()
    }
}

/// A component that carries its own relationship field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Office {
    pub room: Option<String>,
    pub friends: Vec<Friendship>,
}

impl TwinType for Office {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:Office;1")
            .property("room", |o| o.room.clone(), |o, v| o.room = Some(v))
            .relationships("friends", |o| &o.friends, |o| &mut o.friends)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tenant {
    pub id: String,
    pub office: Option<Office>,
}

impl TwinType for Tenant {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model("dtmi:test:Tenant;1")
            .identifier(|t| t.id.clone(), |t, id| t.id = id)
            .component("office", |t| t.office.as_ref(), |t, v| t.office = Some(v))
            .build()
    }
}

/// A mapped type with no model declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unregistered {
    pub label: Option<String>,
}

impl TwinType for Unregistered {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder()
            .property("label", |u| u.label.clone(), |u, v| u.label = Some(v))
            .build()
    }
}

pub fn test_person() -> Person {
    Person {
        id: "p1".into(),
        created_by: Some("Someone".into()),
        name: Some("Test1".into()),
        has_drivers_licence: true,
        birth_date: Some(DateTime::parse_from_rfc3339("1999-04-01T08:30:00+02:00").unwrap()),
        car_count: 1,
        high_score: 0.0,
        time_spent_looking_at_cat_videos: Some(TimeDelta::seconds(14 * 3600 + 2 * 60 + 15)),
        height: 177.0,
        gender: Gender::Female,
        geo_location: Some(GeoLocation {
            latitude: 51.1,
            longitude: -0.5,
        }),
        contact_info: Some(ContactInfo {
            email: Some("x@y".into()),
        }),
        friendships: Vec::new(),
    }
}
