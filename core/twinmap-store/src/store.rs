//! Twin store abstraction.
//!
//! Defines the operations the repository needs from a digital twin graph
//! store, so any backend (a remote service client, the in-memory store) can
//! sit underneath it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use twinmap_model::{RelationshipDescriptor, Twin};

use crate::error::StoreResult;

/// A model document held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    pub id: String,
    pub decommissioned: bool,
    pub upload_time: DateTime<Utc>,
    pub model: Value,
}

/// A digital twin graph store.
///
/// Twins and relationships are upserted idempotently by id; relationships are
/// addressed by their source twin and composite relationship id.
#[async_trait]
pub trait TwinStore: Send + Sync {
    /// Creates or replaces a twin and returns the stored record.
    async fn upsert_twin(&self, twin: &Twin) -> StoreResult<Twin>;

    async fn get_twin(&self, twin_id: &str) -> StoreResult<Twin>;

    /// Deletes a twin. Stores refuse while relationships still reference it.
    async fn delete_twin(&self, twin_id: &str) -> StoreResult<()>;

    /// All twins created with the given model id.
    async fn query_twins_by_model(&self, model_id: &str) -> StoreResult<Vec<Twin>>;

    /// Creates or replaces a relationship keyed by its composite id.
    async fn upsert_relationship(
        &self,
        relationship: &RelationshipDescriptor,
    ) -> StoreResult<RelationshipDescriptor>;

    /// Relationships whose source is `source_id`, in store order.
    async fn get_outgoing_relationships(
        &self,
        source_id: &str,
    ) -> StoreResult<Vec<RelationshipDescriptor>>;

    async fn delete_relationship(&self, source_id: &str, relationship_id: &str)
    -> StoreResult<()>;

    /// Uploads model documents in one batch. Each must carry an `@id`.
    async fn create_models(&self, models: &[Value]) -> StoreResult<Vec<ModelData>>;

    async fn get_model(&self, model_id: &str) -> StoreResult<ModelData>;

    async fn list_models(&self) -> StoreResult<Vec<ModelData>>;

    /// A decommissioned model can no longer back new twins; existing twins
    /// are unaffected.
    async fn decommission_model(&self, model_id: &str) -> StoreResult<()>;

    async fn delete_model(&self, model_id: &str) -> StoreResult<()>;
}
