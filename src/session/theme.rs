use tracing::warn;

use crate::store::{keys, KeyValueStore};

/// The persisted UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<ThemeMode> {
        match raw {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load the persisted theme, defaulting to light. An unrecognized value is
/// treated as unset.
pub async fn load_theme(store: &dyn KeyValueStore) -> ThemeMode {
    match store.get(keys::THEME).await {
        Ok(Some(raw)) => ThemeMode::parse(&raw).unwrap_or(ThemeMode::Light),
        Ok(None) => ThemeMode::Light,
        Err(e) => {
            warn!("Cannot read theme preference: {}", e);
            ThemeMode::Light
        }
    }
}

pub async fn save_theme(store: &dyn KeyValueStore, mode: ThemeMode) -> Result<(), String> {
    store.put(keys::THEME, mode.as_str()).await
}

/// Flip between light and dark, persisting and returning the new mode.
pub async fn toggle_theme(store: &dyn KeyValueStore) -> Result<ThemeMode, String> {
    let next = load_theme(store).await.toggled();
    save_theme(store, next).await?;
    Ok(next)
}
