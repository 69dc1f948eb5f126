use std::sync::Arc;
use std::time::Duration;

use logitron::client::Gateway;
use logitron::config::ApiConfig;
use logitron::notify::Notifier;
use logitron::session::{Session, SessionManager};
use logitron::store::{KeyValueStore, MemoryStore};

pub struct TestStack {
    pub manager: Arc<SessionManager>,
    pub session: Session,
    pub store: Arc<dyn KeyValueStore>,
    pub notifier: Notifier,
}

/// Builds a full client stack against `base_url` with an in-memory store.
/// Notifications never auto-dismiss so tests can assert on them.
pub fn build_stack(base_url: &str) -> TestStack {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let session = Session::new();
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_in_ms: 5_000,
    };
    let gateway = Arc::new(Gateway::new(&config, store.clone(), session.clone()));
    let notifier = Notifier::new(Duration::ZERO);
    let manager = Arc::new(SessionManager::new(
        session.clone(),
        gateway,
        store.clone(),
        notifier.clone(),
    ));

    TestStack {
        manager,
        session,
        store,
        notifier,
    }
}

pub const LOGIN_BODY: &str = r#"{
    "access_token": "acc1",
    "refresh_token": "ref1",
    "user": {
        "id": "6f1c0e4e-8a3c-4a27-9b52-7f5a9cf7a001",
        "username": "ada",
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "full_name": "Ada Lovelace",
        "is_active": true
    }
}"#;

pub const ME_BODY: &str = r#"{
    "user": {
        "id": "6f1c0e4e-8a3c-4a27-9b52-7f5a9cf7a001",
        "username": "ada",
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "full_name": "Ada Lovelace",
        "is_active": true
    }
}"#;
