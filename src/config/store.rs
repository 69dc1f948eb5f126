use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the store configuration, keeping the backend choice
/// under the `store:` section of the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub backend: StoreBackend,
}

/// The available storage backends. We differentiate them via a "type" tag
/// in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
#[serde(tag = "type")]
pub enum StoreBackend {
    /// Volatile storage; tokens are lost when the process exits.
    #[serde(rename = "memory")]
    Memory,
    /// A JSON file on disk; entries survive restarts.
    #[serde(rename = "file")]
    File(FileStoreConfig),
}

/// The config needed for the file backend.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct FileStoreConfig {
    /// Path of the JSON file holding the persisted entries.
    pub path: String,
}
