//! Typed repository over a [`TwinStore`].
//!
//! Each operation maps values with `twinmap_model` and forwards to the store.
//! Mapping failures are raised before any store call is made; store failures
//! come back as `StoreOperationFailed` naming the operation. Batch operations
//! run item by item and stop at the first error.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use twinmap_model::{
    MappingError, RelationshipDescriptor, Twin, TwinRelationship, TwinSchema, TwinType,
    to_descriptor, to_twin,
};

use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, RepositoryResult, StoreResultExt};
use crate::store::{ModelData, TwinStore};

/// Saves and loads mapped values as twins and relationships.
pub struct TwinRepository {
    store: Arc<dyn TwinStore>,
    config: RepositoryConfig,
}

impl TwinRepository {
    pub fn new(store: Arc<dyn TwinStore>) -> Self {
        Self::with_config(store, RepositoryConfig::default())
    }

    pub fn with_config(store: Arc<dyn TwinStore>, config: RepositoryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TwinStore> {
        &self.store
    }

    // ── Twins ────────────────────────────────────────────────────

    /// Encodes `value` and upserts it under its identifier and model id.
    pub async fn save<T: TwinType>(&self, value: &T) -> RepositoryResult<Twin> {
        let twin = to_twin(value, self.config.encode_mode)?;
        debug!("Saving twin {} ({})", twin.id, twin.model_id());
        self.store.upsert_twin(&twin).await.during("save")
    }

    /// Saves `value`, then upserts every instance held in its relationship
    /// fields as an outgoing relationship.
    pub async fn save_graph<T: TwinType>(&self, value: &T) -> RepositoryResult<Twin> {
        let schema = T::schema()?;
        let twin = schema.to_twin(value, self.config.encode_mode)?;
        let relationships = schema.relationships_of(value, &twin.id)?;

        let stored = self.store.upsert_twin(&twin).await.during("save_graph")?;
        for relationship in &relationships {
            self.store
                .upsert_relationship(relationship)
                .await
                .during("save_graph")?;
        }
        debug!(
            "Saved twin {} with {} relationship(s)",
            stored.id,
            relationships.len()
        );
        Ok(stored)
    }

    /// Fetches a twin and its outgoing relationships and decodes them.
    pub async fn load<T: TwinType>(&self, twin_id: &str) -> RepositoryResult<T> {
        let schema = T::schema()?;
        decodable_model(&schema)?;
        let twin = self.store.get_twin(twin_id).await.during("load")?;
        let relationships = self.relationships_for(&twin.id, "load").await?;
        Ok(schema.from_twin(&twin, &relationships)?)
    }

    /// Fetches the raw twin record.
    pub async fn load_twin(&self, twin_id: &str) -> RepositoryResult<Twin> {
        self.store.get_twin(twin_id).await.during("load_twin")
    }

    /// Decodes every twin of `T`'s model, each with its outgoing
    /// relationships.
    pub async fn load_all<T: TwinType>(&self) -> RepositoryResult<Vec<T>> {
        let schema = T::schema()?;
        let model_id = decodable_model(&schema)?;
        let twins = self
            .store
            .query_twins_by_model(&model_id)
            .await
            .during("load_all")?;
        debug!("Query for {} returned {} twin(s)", model_id, twins.len());

        let mut values = Vec::with_capacity(twins.len());
        for twin in &twins {
            let relationships = self.relationships_for(&twin.id, "load_all").await?;
            values.push(schema.from_twin(twin, &relationships)?);
        }
        Ok(values)
    }

    pub async fn delete(&self, twin_id: &str) -> RepositoryResult<()> {
        self.store.delete_twin(twin_id).await.during("delete")
    }

    /// Removes a set of values: every relationship they hold first, then the
    /// twins themselves, so no twin is deleted while an edge still points at it.
    pub async fn delete_graph<T: TwinType>(&self, values: &[T]) -> RepositoryResult<()> {
        let schema = T::schema()?;
        let mut twin_ids = Vec::with_capacity(values.len());
        let mut relationships = Vec::new();
        for value in values {
            let twin_id = schema
                .identifier_of(value)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| MappingError::MissingIdentifier {
                    type_name: schema.type_name().to_string(),
                })?;
            relationships.extend(schema.relationships_of(value, &twin_id)?);
            twin_ids.push(twin_id);
        }

        for relationship in &relationships {
            self.store
                .delete_relationship(&relationship.source_id, &relationship.relationship_id)
                .await
                .during("delete_graph")?;
        }
        for twin_id in &twin_ids {
            self.store
                .delete_twin(twin_id)
                .await
                .during("delete_graph")?;
        }
        info!(
            "Deleted {} twin(s) and {} relationship(s)",
            twin_ids.len(),
            relationships.len()
        );
        Ok(())
    }

    // ── Relationships ────────────────────────────────────────────

    /// Upserts one relationship of `source_id`, keyed by its composite id.
    pub async fn save_relationship<R: TwinRelationship>(
        &self,
        source_id: &str,
        relationship: &R,
    ) -> RepositoryResult<RelationshipDescriptor> {
        let descriptor = to_descriptor(relationship, source_id)?;
        debug!("Saving relationship {}", descriptor.relationship_id);
        self.store
            .upsert_relationship(&descriptor)
            .await
            .during("save_relationship")
    }

    /// Outgoing relationships of `source_id` named `R::RELATIONSHIP_NAME`.
    pub async fn load_relationships<R: TwinRelationship>(
        &self,
        source_id: &str,
    ) -> RepositoryResult<Vec<R>> {
        let descriptors = self
            .store
            .get_outgoing_relationships(source_id)
            .await
            .during("load_relationships")?;
        let schema = R::schema()?;
        let relationships = descriptors
            .iter()
            .filter(|d| d.relationship_name == R::RELATIONSHIP_NAME)
            .map(|d| schema.from_descriptor(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relationships)
    }

    pub async fn delete_relationship(
        &self,
        source_id: &str,
        relationship_id: &str,
    ) -> RepositoryResult<()> {
        self.store
            .delete_relationship(source_id, relationship_id)
            .await
            .during("delete_relationship")
    }

    async fn relationships_for(
        &self,
        twin_id: &str,
        operation: &'static str,
    ) -> RepositoryResult<Vec<RelationshipDescriptor>> {
        if !self.config.load_relationships {
            return Ok(Vec::new());
        }
        self.store
            .get_outgoing_relationships(twin_id)
            .await
            .during(operation)
    }

    // ── Models ───────────────────────────────────────────────────

    /// Uploads model documents. A document may hold one model or an array of
    /// models. Models the store already holds are skipped (unless disabled in
    /// the config); the rest go up in a single batch. Returns the uploaded
    /// model ids.
    pub async fn upload_models(&self, documents: &[String]) -> RepositoryResult<Vec<String>> {
        let mut models = Vec::new();
        for (index, document) in documents.iter().enumerate() {
            let parsed: Value = serde_json::from_str(document).map_err(|e| {
                RepositoryError::InvalidModel(format!("document {index} is not valid JSON: {e}"))
            })?;
            match parsed {
                Value::Array(items) => models.extend(items),
                single => models.push(single),
            }
        }

        let mut ids = Vec::with_capacity(models.len());
        for model in &models {
            let id = model
                .get("@id")
                .and_then(Value::as_str)
                .ok_or_else(|| RepositoryError::InvalidModel("model has no @id".to_string()))?;
            ids.push(id.to_string());
        }

        let existing: HashSet<String> = if self.config.skip_existing_models {
            self.store
                .list_models()
                .await
                .during("upload_models")?
                .into_iter()
                .map(|m| m.id)
                .collect()
        } else {
            HashSet::new()
        };

        let mut to_upload = Vec::new();
        let mut uploaded_ids = Vec::new();
        for (id, model) in ids.into_iter().zip(models) {
            if existing.contains(&id) {
                info!("Model {} already exists. Skipping...", id);
                continue;
            }
            uploaded_ids.push(id);
            to_upload.push(model);
        }
        if to_upload.is_empty() {
            return Ok(uploaded_ids);
        }

        self.store
            .create_models(&to_upload)
            .await
            .during("upload_models")?;
        info!("Uploaded {} model(s)", uploaded_ids.len());
        Ok(uploaded_ids)
    }

    pub async fn get_model(&self, model_id: &str) -> RepositoryResult<ModelData> {
        self.store.get_model(model_id).await.during("get_model")
    }

    pub async fn list_models(&self) -> RepositoryResult<Vec<ModelData>> {
        self.store.list_models().await.during("list_models")
    }

    pub async fn decommission_model(&self, model_id: &str) -> RepositoryResult<()> {
        self.store
            .decommission_model(model_id)
            .await
            .during("decommission_model")
    }

    pub async fn delete_model(&self, model_id: &str) -> RepositoryResult<()> {
        self.store.delete_model(model_id).await.during("delete_model")
    }
}

/// The model id of a type that can be decoded as a twin.
fn decodable_model<T>(schema: &TwinSchema<T>) -> Result<String, MappingError> {
    schema
        .model_id()
        .map(str::to_owned)
        .map_err(|_| MappingError::UnknownType(schema.type_name().to_string()))
}
