use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;

/// A JSON-file-backed store, the durable analog of a browser's localStorage.
/// The whole map is rewritten on each mutation; entries survive restarts.
pub struct FileStore {
    path: PathBuf,
    // Held across the write-back so concurrent mutations cannot interleave.
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing entries. A missing
    /// file starts the store empty; it is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| format!("Corrupt store file '{}': {}", path.display(), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(format!(
                    "Cannot read store file '{}': {}",
                    path.display(),
                    e
                ))
            }
        };
        Ok(FileStore {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> Result<(), String> {
        let raw = serde_json::to_string_pretty(entries).map_err(|e| e.to_string())?;
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            format!(
                "Cannot write store file '{}': {}",
                self.path.display(),
                e
            )
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        debug!("Persisting '{}' to {}", key, self.path.display());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await
        } else {
            Ok(())
        }
    }
}
