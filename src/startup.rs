//! Application startup: builds the client stack from configuration.
//!
//! This module wires the store, request gateway, notification bus and
//! session manager together so the binary and tests construct them the
//! same way.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::client::Gateway;
use crate::config::ConfigV1;
use crate::notify::Notifier;
use crate::session::{Session, SessionManager};
use crate::state::AppContext;
use crate::store::create_store;

/// Builds the full client stack for the configured API.
pub async fn build(config: Arc<ConfigV1>) -> AppContext {
    let store = create_store(&config.store).await;
    let session = Session::new();
    let gateway = Arc::new(Gateway::new(&config.api, store.clone(), session.clone()));
    let notifier = Notifier::new(Duration::from_millis(
        config.notifications.default_duration_ms,
    ));
    let session_manager = Arc::new(SessionManager::new(
        session.clone(),
        gateway.clone(),
        store.clone(),
        notifier.clone(),
    ));

    debug!("Client stack ready for {}", config.api.base_url);

    AppContext {
        config,
        store,
        gateway,
        session,
        session_manager,
        notifier,
    }
}
