use std::sync::Arc;

use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::state::Session;
use crate::client::{ApiError, Gateway, RequestOptions};
use crate::models::payloads::{ApiMessage, LoginResponse, MeResponse};
use crate::models::{TokenPair, User};
use crate::notify::{Notifier, Severity};
use crate::store::{keys, KeyValueStore};

/// Owns the authentication lifecycle: startup initialization, login, logout
/// and password changes. Failures never escape as panics; every operation
/// returns a discriminated result and reports to the notification bus.
pub struct SessionManager {
    session: Session,
    gateway: Arc<Gateway>,
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    init: OnceCell<()>,
}

impl SessionManager {
    pub fn new(
        session: Session,
        gateway: Arc<Gateway>,
        store: Arc<dyn KeyValueStore>,
        notifier: Notifier,
    ) -> Self {
        SessionManager {
            session,
            gateway,
            store,
            notifier,
            init: OnceCell::new(),
        }
    }

    /// The current identity, if authenticated.
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn is_initializing(&self) -> bool {
        self.session.is_initializing()
    }

    /// Restore the session from persisted tokens. The body runs once per
    /// process; concurrent and repeated calls await the first run's result.
    /// Without a persisted access token no network call is made.
    pub async fn initialize(&self) {
        self.init
            .get_or_init(|| async {
                let token = match self.store.get(keys::ACCESS_TOKEN).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!("Cannot read persisted tokens: {}", e);
                        None
                    }
                };

                if token.is_some() {
                    match self.refresh_identity().await {
                        Ok(user) => {
                            info!("Session restored for '{}'", user.username);
                        }
                        Err(e) => {
                            warn!("Session restore failed: {}", e);
                            if let Err(e) = TokenPair::clear(self.store.as_ref()).await {
                                warn!("Failed to clear persisted tokens: {}", e);
                            }
                            self.session.clear_user();
                        }
                    }
                } else {
                    debug!("No persisted access token; starting unauthenticated");
                }

                self.session.finish_initializing();
            })
            .await;
    }

    /// Re-fetch the identity from the server and update the session. On an
    /// unrecoverable auth failure the gateway has already cleared the
    /// session; any other failure leaves it untouched.
    pub async fn refresh_identity(&self) -> Result<User, ApiError> {
        let user = self.fetch_current_user().await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Authenticate with username and password. On success the token pair
    /// is persisted and the identity set before returning.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        match self.try_login(username, password).await {
            Ok(user) => {
                self.notifier.notify(
                    "Signed in",
                    format!("Welcome, {}!", user.first_name),
                    Severity::Success,
                );
                Ok(user)
            }
            Err(e) => {
                self.notifier
                    .notify("Sign-in failed", e.message(), Severity::Error);
                Err(e)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        // Deliberately not routed through the gateway's retry path: a 401
        // here means bad credentials, not an expired access token.
        let body = json!({ "username": username, "password": password });
        let response = self.gateway.post_public("/auth/login", &body).await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Unable to sign in").await;
            return Err(if status == reqwest::StatusCode::UNAUTHORIZED {
                ApiError::Authentication(message)
            } else {
                ApiError::Server {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let payload: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let LoginResponse {
            access_token,
            refresh_token,
            user,
        } = payload;

        TokenPair {
            access_token,
            refresh_token,
        }
        .persist(self.store.as_ref())
        .await
        .map_err(ApiError::Storage)?;
        self.session.set_user(user.clone());
        info!("User '{}' signed in", user.username);
        Ok(user)
    }

    /// End the session. The server is notified best-effort; local state is
    /// cleared regardless of the outcome.
    pub async fn logout(&self) {
        if let Err(e) = self
            .gateway
            .request("/auth/logout", RequestOptions::post())
            .await
        {
            warn!("Server-side logout failed: {}", e);
        }

        if let Err(e) = TokenPair::clear(self.store.as_ref()).await {
            warn!("Failed to clear persisted tokens: {}", e);
        }
        self.session.clear_user();
        info!("Signed out");
        self.notifier.notify(
            "Signed out",
            "You have been disconnected",
            Severity::Info,
        );
    }

    /// Change the authenticated user's password.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), ApiError> {
        match self.try_change_password(current, new).await {
            Ok(()) => {
                self.notifier.notify(
                    "Password changed",
                    "Your password has been updated",
                    Severity::Success,
                );
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify("Password change failed", e.message(), Severity::Error);
                Err(e)
            }
        }
    }

    async fn try_change_password(&self, current: &str, new: &str) -> Result<(), ApiError> {
        let body = json!({ "current_password": current, "new_password": new });
        let response = self
            .gateway
            .request("/auth/change-password", RequestOptions::post().json(body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Unable to change password").await;
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn fetch_current_user(&self) -> Result<User, ApiError> {
        let response = self.gateway.request("/auth/me", RequestOptions::get()).await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Unable to fetch the current user").await;
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let payload: MeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(payload.user)
    }

    /// The server's `message` field when the body carries one, otherwise
    /// the fallback.
    async fn error_message(response: reqwest::Response, fallback: &str) -> String {
        match response.json::<ApiMessage>().await {
            Ok(body) => body.message,
            Err(_) => fallback.to_string(),
        }
    }
}
