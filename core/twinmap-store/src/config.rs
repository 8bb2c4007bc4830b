use serde::{Deserialize, Serialize};
use twinmap_model::EncodeMode;

/// Repository configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// How absent properties are written when saving twins.
    pub encode_mode: EncodeMode,
    /// Fetch outgoing relationships when loading twins.
    pub load_relationships: bool,
    /// Skip model documents the store already holds when uploading.
    pub skip_existing_models: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            encode_mode: EncodeMode::Sparse,
            load_relationships: true,
            skip_existing_models: true,
        }
    }
}
