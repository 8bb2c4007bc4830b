//! The person graph the demo writes: people with an object, a component and
//! friendship relationships.

use chrono::{DateTime, FixedOffset, TimeDelta};
use twinmap_model::{MappingResult, TwinRelationship, TwinSchema, TwinType, twin_enum};

pub const PERSON_MODEL: &str = "dtmi:test:TestPerson;1";
pub const CONTACT_INFO_MODEL: &str = "dtmi:test:TestContactInfo;1";

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
        TwinSchema::<Self>::model(CONTACT_INFO_MODEL)
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
    /// Components cannot be absent, so every person starts with a blank one.
    pub contact_info: Option<ContactInfo>,
    pub friendships: Vec<Friendship>,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contact_info: Some(ContactInfo::default()),
            ..Self::default()
        }
    }
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
