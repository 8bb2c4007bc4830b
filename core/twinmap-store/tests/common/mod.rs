#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use twinmap_model::{MappingResult, TwinRelationship, TwinSchema, TwinType};
use twinmap_store::{InMemoryTwinStore, RepositoryConfig, TwinRepository};

pub const PERSON_MODEL: &str = "dtmi:test:Person;1";

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
    pub name: Option<String>,
    pub age: i32,
    pub friends: Vec<Friendship>,
}

impl TwinType for Person {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::model(PERSON_MODEL)
            .identifier(|p| p.id.clone(), |p, id| p.id = id)
            .property("name", |p| p.name.clone(), |p, v| p.name = Some(v))
            .property("age", |p| Some(p.age), |p, v| p.age = v)
            .relationships("friends", |p| &p.friends, |p| &mut p.friends)
            .build()
    }
}

/// Mapped, but with no model declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub text: Option<String>,
}

impl TwinType for Note {
    fn schema() -> MappingResult<TwinSchema<Self>> {
        TwinSchema::<Self>::builder()
            .property("text", |n| n.text.clone(), |n, v| n.text = Some(v))
            .build()
    }
}

pub fn person(id: &str, name: &str, age: i32) -> Person {
    Person {
        id: id.to_string(),
        name: Some(name.to_string()),
        age,
        friends: Vec::new(),
    }
}

pub fn friend(target_id: &str) -> Friendship {
    Friendship {
        target_id: target_id.to_string(),
        comment: None,
    }
}

pub fn person_model() -> Value {
    json!({
        "@id": PERSON_MODEL,
        "@type": "Interface",
        "@context": "dtmi:dtdl:context;2",
        "contents": [
            { "@type": "Property", "name": "name", "schema": "string" },
            { "@type": "Property", "name": "age", "schema": "integer" },
            { "@type": "Relationship", "name": "isFriendOf" }
        ]
    })
}

pub fn make_repository() -> (Arc<InMemoryTwinStore>, TwinRepository) {
    make_repository_with_config(RepositoryConfig::default())
}

pub fn make_repository_with_config(
    config: RepositoryConfig,
) -> (Arc<InMemoryTwinStore>, TwinRepository) {
    let store = Arc::new(InMemoryTwinStore::new());
    let repository = TwinRepository::with_config(store.clone(), config);
    (store, repository)
}
