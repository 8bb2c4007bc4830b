use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::relationship::relationship_id;

/// The generic nested key-value representation exchanged with the twin store.
pub type PropertyBag = serde_json::Map<String, Value>;

/// Reserved key written into component sub-bags. Plain object sub-bags never
/// carry it; the store tells the two apart by this key alone.
pub const COMPONENT_METADATA_KEY: &str = "$metadata";

/// A twin as stored in the graph: external id, model id and content bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Twin {
    #[serde(rename = "$dtId")]
    pub id: String,
    #[serde(rename = "$etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(rename = "$metadata")]
    pub metadata: TwinMetadata,
    #[serde(flatten)]
    pub contents: PropertyBag,
}

/// Store-level metadata attached to every twin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwinMetadata {
    #[serde(rename = "$model")]
    pub model_id: String,
}

impl Twin {
    pub fn new(id: impl Into<String>, model_id: impl Into<String>, contents: PropertyBag) -> Self {
        Self {
            id: id.into(),
            etag: None,
            metadata: TwinMetadata {
                model_id: model_id.into(),
            },
            contents,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.metadata.model_id
    }

    /// Look up a value by slash-separated path (e.g., "/contactInfo/email").
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.trim_start_matches('/').split('/');
        let first = self.contents.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.get(segment))
    }

    /// Extract a string value by path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Extract a boolean value by path.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value by path.
    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(|v| v.as_f64())
    }
}

/// A directed, named edge between two twins with its own property bag.
///
/// Relationships never live inside a twin's contents; they are separate
/// records addressed by [`relationship_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    #[serde(rename = "$relationshipId")]
    pub relationship_id: String,
    #[serde(rename = "$sourceId")]
    pub source_id: String,
    #[serde(rename = "$relationshipName")]
    pub relationship_name: String,
    #[serde(rename = "$targetId")]
    pub target_id: String,
    #[serde(flatten)]
    pub properties: PropertyBag,
}

impl RelationshipDescriptor {
    /// Builds a descriptor whose id is the composite key of its endpoints.
    pub fn new(
        source_id: impl Into<String>,
        relationship_name: impl Into<String>,
        target_id: impl Into<String>,
        properties: PropertyBag,
    ) -> Self {
        let source_id = source_id.into();
        let relationship_name = relationship_name.into();
        let target_id = target_id.into();
        Self {
            relationship_id: relationship_id(&source_id, &relationship_name, &target_id),
            source_id,
            relationship_name,
            target_id,
            properties,
        }
    }
}
