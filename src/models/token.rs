use serde::{Deserialize, Serialize};

use crate::store::{keys, KeyValueStore};

/// The access/refresh token pair persisted between runs.
///
/// The access token is short-lived and attached as the bearer credential on
/// authenticated requests; the refresh token is longer-lived and used only to
/// mint a new access token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    /// Persist both tokens under their well-known keys. The newest pair
    /// overwrites whatever was stored before.
    pub async fn persist(&self, store: &dyn KeyValueStore) -> Result<(), String> {
        store.put(keys::ACCESS_TOKEN, &self.access_token).await?;
        store.put(keys::REFRESH_TOKEN, &self.refresh_token).await
    }

    /// Load the persisted pair. Returns None unless both halves are present.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Option<TokenPair>, String> {
        let access = store.get(keys::ACCESS_TOKEN).await?;
        let refresh = store.get(keys::REFRESH_TOKEN).await?;
        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(TokenPair {
                access_token,
                refresh_token,
            }),
            _ => None,
        })
    }

    /// Remove both tokens. Safe to call when nothing is persisted.
    pub async fn clear(store: &dyn KeyValueStore) -> Result<(), String> {
        store.remove(keys::ACCESS_TOKEN).await?;
        store.remove(keys::REFRESH_TOKEN).await
    }
}
