//! Shared application context.
//!
//! Contains the wired client stack handed to the CLI (or an embedding UI):
//! configuration, storage, the request gateway, the session and the
//! notification bus.

use crate::client::Gateway;
use crate::config::ConfigV1;
use crate::notify::Notifier;
use crate::session::{Session, SessionManager};
use crate::store::KeyValueStore;
use std::sync::Arc;

/// Everything built once at startup and shared by the consumers.
#[derive(Clone)]
pub struct AppContext {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Durable key-value storage for tokens and preferences.
    pub store: Arc<dyn KeyValueStore>,
    /// Authenticated request gateway.
    pub gateway: Arc<Gateway>,
    /// Shared session state handle.
    pub session: Session,
    /// The session lifecycle owner: initialize, login, logout.
    pub session_manager: Arc<SessionManager>,
    /// Bus for transient user-facing messages.
    pub notifier: Notifier,
}
