//! An in-memory twin store for tests and local runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use twinmap_model::{RelationshipDescriptor, Twin};

use crate::error::{StoreError, StoreResult};
use crate::store::{ModelData, TwinStore};

#[derive(Debug, Default)]
struct State {
    twins: BTreeMap<String, Twin>,
    /// Outgoing relationships per source twin, in insertion order.
    relationships: BTreeMap<String, Vec<RelationshipDescriptor>>,
    models: BTreeMap<String, ModelData>,
    etag: u64,
}

impl State {
    fn has_relationships(&self, twin_id: &str) -> bool {
        self.relationships
            .get(twin_id)
            .is_some_and(|outgoing| !outgoing.is_empty())
            || self
                .relationships
                .values()
                .flatten()
                .any(|r| r.target_id == twin_id)
    }
}

/// A [`TwinStore`] held entirely in memory.
///
/// Mirrors the rules a hosted twin service enforces: relationships need both
/// endpoints to exist, twins cannot be deleted while relationships reference
/// them, and model ids are unique. In strict mode twins must also use an
/// uploaded, non-decommissioned model.
#[derive(Debug, Default)]
pub struct InMemoryTwinStore {
    state: RwLock<State>,
    strict_models: bool,
    requests: AtomicUsize,
}

impl InMemoryTwinStore {
    /// A store that accepts twins of any model id.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that only accepts twins whose model has been uploaded and not
    /// decommissioned.
    pub fn strict() -> Self {
        Self {
            strict_models: true,
            ..Self::default()
        }
    }

    /// Number of store calls made so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn twin_count(&self) -> usize {
        self.state.read().await.twins.len()
    }

    pub async fn relationship_count(&self) -> usize {
        self.state.read().await.relationships.values().map(Vec::len).sum()
    }

    fn record(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TwinStore for InMemoryTwinStore {
    async fn upsert_twin(&self, twin: &Twin) -> StoreResult<Twin> {
        self.record();
        if twin.id.is_empty() {
            return Err(StoreError::bad_request("twin id must not be empty"));
        }
        let mut state = self.state.write().await;
        if self.strict_models {
            match state.models.get(twin.model_id()) {
                None => {
                    return Err(StoreError::bad_request(format!(
                        "model {} does not exist",
                        twin.model_id()
                    )));
                }
                Some(model) if model.decommissioned => {
                    return Err(StoreError::bad_request(format!(
                        "model {} is decommissioned",
                        twin.model_id()
                    )));
                }
                Some(_) => {}
            }
        }
        state.etag += 1;
        let mut stored = twin.clone();
        stored.etag = Some(format!("W/\"{}\"", state.etag));
        debug!("Stored twin {} ({})", stored.id, stored.model_id());
        state.twins.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_twin(&self, twin_id: &str) -> StoreResult<Twin> {
        self.record();
        self.state
            .read()
            .await
            .twins
            .get(twin_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("twin {twin_id} not found")))
    }

    async fn delete_twin(&self, twin_id: &str) -> StoreResult<()> {
        self.record();
        let mut state = self.state.write().await;
        if !state.twins.contains_key(twin_id) {
            return Err(StoreError::not_found(format!("twin {twin_id} not found")));
        }
        if state.has_relationships(twin_id) {
            return Err(StoreError::conflict(format!(
                "twin {twin_id} still has relationships"
            )));
        }
        state.twins.remove(twin_id);
        state.relationships.remove(twin_id);
        Ok(())
    }

    async fn query_twins_by_model(&self, model_id: &str) -> StoreResult<Vec<Twin>> {
        self.record();
        Ok(self
            .state
            .read()
            .await
            .twins
            .values()
            .filter(|t| t.model_id() == model_id)
            .cloned()
            .collect())
    }

    async fn upsert_relationship(
        &self,
        relationship: &RelationshipDescriptor,
    ) -> StoreResult<RelationshipDescriptor> {
        self.record();
        let mut state = self.state.write().await;
        for endpoint in [&relationship.source_id, &relationship.target_id] {
            if !state.twins.contains_key(endpoint.as_str()) {
                return Err(StoreError::not_found(format!("twin {endpoint} not found")));
            }
        }
        let outgoing = state
            .relationships
            .entry(relationship.source_id.clone())
            .or_default();
        match outgoing
            .iter_mut()
            .find(|r| r.relationship_id == relationship.relationship_id)
        {
            Some(existing) => *existing = relationship.clone(),
            None => outgoing.push(relationship.clone()),
        }
        debug!("Stored relationship {}", relationship.relationship_id);
        Ok(relationship.clone())
    }

    async fn get_outgoing_relationships(
        &self,
        source_id: &str,
    ) -> StoreResult<Vec<RelationshipDescriptor>> {
        self.record();
        let state = self.state.read().await;
        if !state.twins.contains_key(source_id) {
            return Err(StoreError::not_found(format!("twin {source_id} not found")));
        }
        Ok(state.relationships.get(source_id).cloned().unwrap_or_default())
    }

    async fn delete_relationship(
        &self,
        source_id: &str,
        relationship_id: &str,
    ) -> StoreResult<()> {
        self.record();
        let mut state = self.state.write().await;
        let outgoing = state.relationships.get_mut(source_id);
        let position = outgoing
            .as_ref()
            .and_then(|list| list.iter().position(|r| r.relationship_id == relationship_id));
        match (outgoing, position) {
            (Some(list), Some(index)) => {
                list.remove(index);
                Ok(())
            }
            _ => Err(StoreError::not_found(format!(
                "relationship {relationship_id} not found on twin {source_id}"
            ))),
        }
    }

    async fn create_models(&self, models: &[Value]) -> StoreResult<Vec<ModelData>> {
        self.record();
        let mut state = self.state.write().await;

        let mut ids = Vec::with_capacity(models.len());
        for model in models {
            let id = model
                .get("@id")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::bad_request("model document has no @id"))?;
            if state.models.contains_key(id) || ids.contains(&id) {
                return Err(StoreError::conflict(format!("model {id} already exists")));
            }
            ids.push(id);
        }

        let upload_time = Utc::now();
        let created: Vec<ModelData> = ids
            .into_iter()
            .zip(models)
            .map(|(id, model)| ModelData {
                id: id.to_string(),
                decommissioned: false,
                upload_time,
                model: model.clone(),
            })
            .collect();
        for model in &created {
            state.models.insert(model.id.clone(), model.clone());
        }
        Ok(created)
    }

    async fn get_model(&self, model_id: &str) -> StoreResult<ModelData> {
        self.record();
        self.state
            .read()
            .await
            .models
            .get(model_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("model {model_id} not found")))
    }

    async fn list_models(&self) -> StoreResult<Vec<ModelData>> {
        self.record();
        Ok(self.state.read().await.models.values().cloned().collect())
    }

    async fn decommission_model(&self, model_id: &str) -> StoreResult<()> {
        self.record();
        let mut state = self.state.write().await;
        let model = state
            .models
            .get_mut(model_id)
            .ok_or_else(|| StoreError::not_found(format!("model {model_id} not found")))?;
        model.decommissioned = true;
        Ok(())
    }

    async fn delete_model(&self, model_id: &str) -> StoreResult<()> {
        self.record();
        self.state
            .write()
            .await
            .models
            .remove(model_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("model {model_id} not found")))
    }
}
