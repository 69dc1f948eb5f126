use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::{StoreBackend, StoreConfig};

/// Well-known keys for the persisted client state.
pub mod keys {
    /// Short-lived credential attached as the bearer token on requests.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Longer-lived credential used only to mint a new access token.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// UI theme preference, "light" or "dark".
    pub const THEME: &str = "theme";
}

/// The KeyValueStore trait abstracts durable client-local storage
/// (get, put, remove), so the backend can be swapped without touching
/// the session or gateway code.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, String>;
    async fn put(&self, key: &str, value: &str) -> Result<(), String>;
    async fn remove(&self, key: &str) -> Result<(), String>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub async fn create_store(config: &StoreConfig) -> Arc<dyn KeyValueStore> {
    match &config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; tokens will not survive a restart.");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File(file_config) => match FileStore::open(&file_config.path) {
            Ok(store) => {
                info!("Opened file store at '{}'.", file_config.path);
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to open file store: {}", e);
                std::process::exit(1);
            }
        },
    }
}
