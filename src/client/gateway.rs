use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::models::payloads::RefreshResponse;
use crate::models::TokenPair;
use crate::session::Session;
use crate::store::{keys, KeyValueStore};

/// Options for a gateway request: method, extra headers, optional JSON body.
/// Caller headers win over the defaults; the computed authorization header
/// is applied last.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        RequestOptions {
            method: Method::GET,
            ..Default::default()
        }
    }

    pub fn post() -> Self {
        RequestOptions {
            method: Method::POST,
            ..Default::default()
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Wraps outbound API calls with bearer authentication and recovers
/// transparently from access-token expiry: a 401 triggers one refresh and
/// one replay of the original request, never more.
pub struct Gateway {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
    store: Arc<dyn KeyValueStore>,
    session: Session,
    // Serializes the token read-modify-write across concurrent callers.
    refresh_lock: Mutex<()>,
}

impl Gateway {
    pub fn new(config: &ApiConfig, store: Arc<dyn KeyValueStore>, session: Session) -> Self {
        Gateway {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_in_ms),
            http: reqwest::Client::new(),
            store,
            session,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Issue an authenticated request. On a 401 the access token is refreshed
    /// and the request reissued exactly once; that retry's response is
    /// returned whatever its status. A failed refresh clears the session and
    /// tokens and fails the call with `SessionExpired`.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let token = self.access_token().await?;
        let headers = self.build_headers(&options.headers, token.as_deref());
        let response = self
            .execute(endpoint, options.method.clone(), headers, options.body.as_ref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Got 401 from '{}', attempting token refresh", endpoint);
        if let Err(e) = self.refresh_access_token().await {
            warn!("Token refresh failed: {}", e);
            self.force_logout().await;
            return Err(ApiError::SessionExpired);
        }

        let token = self.access_token().await?;
        let headers = self.build_headers(&options.headers, token.as_deref());
        self.execute(endpoint, options.method, headers, options.body.as_ref())
            .await
    }

    /// Issue an unauthenticated POST, bypassing bearer attachment and the
    /// 401 retry logic. Used for login, where a 401 means bad credentials
    /// rather than an expired access token.
    pub async fn post_public(&self, endpoint: &str, body: &Value) -> Result<Response, ApiError> {
        let headers = self.build_headers(&HeaderMap::new(), None);
        self.execute(endpoint, Method::POST, headers, Some(body)).await
    }

    /// Exchange the persisted refresh token for a new access token. Fails
    /// immediately, with no network call, when no refresh token is persisted.
    /// The refresh token itself is not rotated; persisted state is only
    /// mutated on success.
    pub async fn refresh_access_token(&self) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = self
            .store
            .get(keys::REFRESH_TOKEN)
            .await
            .map_err(ApiError::Storage)?
            .ok_or_else(|| ApiError::Authentication("No refresh token persisted".to_string()))?;

        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .timeout(self.timeout)
            .bearer_auth(&refresh_token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: "Refresh rejected".to_string(),
            });
        }

        let payload: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.store
            .put(keys::ACCESS_TOKEN, &payload.access_token)
            .await
            .map_err(ApiError::Storage)?;
        debug!("Access token refreshed");
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn build_headers(&self, caller: &HeaderMap, token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in caller {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!("Persisted access token is not a valid header value: {}", e),
            }
        }
        headers
    }

    async fn execute(
        &self,
        endpoint: &str,
        method: Method,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .http
            .request(method, self.url(endpoint))
            .headers(headers)
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    async fn access_token(&self) -> Result<Option<String>, ApiError> {
        self.store
            .get(keys::ACCESS_TOKEN)
            .await
            .map_err(ApiError::Storage)
    }

    /// Unrecoverable auth failure: drop the persisted tokens and the
    /// in-memory identity. Storage errors here are logged, not surfaced;
    /// local cleanup must not fail the caller.
    async fn force_logout(&self) {
        if let Err(e) = TokenPair::clear(self.store.as_ref()).await {
            warn!("Failed to clear persisted tokens: {}", e);
        }
        self.session.clear_user();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::store::MemoryStore;
    use mockito::{Matcher, Server};

    fn test_gateway(base_url: &str) -> (Gateway, Arc<dyn KeyValueStore>, Session) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = Session::new();
        let config = ApiConfig {
            base_url: base_url.to_string(),
            timeout_in_ms: 5_000,
        };
        let gateway = Gateway::new(&config, store.clone(), session.clone());
        (gateway, store, session)
    }

    fn test_user() -> User {
        User {
            id: "1".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        }
    }

    /// Test that the persisted access token is attached as a bearer header.
    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/auth/me")
            .match_header("authorization", "Bearer tok123")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let (gateway, store, _session) = test_gateway(&server.url());
        store.put(keys::ACCESS_TOKEN, "tok123").await.unwrap();

        let response = gateway.request("/auth/me", RequestOptions::get()).await.unwrap();
        m.assert_async().await;
        assert_eq!(response.status(), 200);
    }

    /// Test that no authorization header is sent without a persisted token.
    #[tokio::test]
    async fn test_no_token_no_auth_header() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/data/products")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let (gateway, _store, _session) = test_gateway(&server.url());

        let response = gateway
            .request("/data/products", RequestOptions::get())
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(response.status(), 200);
    }

    /// Test that caller headers override the defaults.
    #[tokio::test]
    async fn test_caller_headers_take_precedence() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/data/export")
            .match_header("content-type", "text/csv")
            .with_status(200)
            .create_async()
            .await;

        let (gateway, _store, _session) = test_gateway(&server.url());

        let options =
            RequestOptions::get().header(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        gateway.request("/data/export", options).await.unwrap();
        m.assert_async().await;
    }

    /// Test that a 401 triggers one refresh and one replay with the new
    /// token, and that the replay's response is returned.
    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let mut server = Server::new_async().await;
        let stale = server
            .mock("GET", "/data/products")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .match_header("authorization", "Bearer refresh1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh"}"#)
            .expect(1)
            .create_async()
            .await;
        let retry = server
            .mock("GET", "/data/products")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .expect(1)
            .create_async()
            .await;

        let (gateway, store, session) = test_gateway(&server.url());
        store.put(keys::ACCESS_TOKEN, "stale").await.unwrap();
        store.put(keys::REFRESH_TOKEN, "refresh1").await.unwrap();
        session.set_user(test_user());

        let response = gateway
            .request("/data/products", RequestOptions::get())
            .await
            .unwrap();

        stale.assert_async().await;
        refresh.assert_async().await;
        retry.assert_async().await;
        assert_eq!(response.status(), 200);
        // The new access token is persisted; the refresh token is not rotated.
        assert_eq!(
            store.get(keys::ACCESS_TOKEN).await.unwrap().as_deref(),
            Some("fresh")
        );
        assert_eq!(
            store.get(keys::REFRESH_TOKEN).await.unwrap().as_deref(),
            Some("refresh1")
        );
        assert!(session.is_authenticated());
    }

    /// Test that the replay's response is returned even when it fails,
    /// with no second refresh attempt.
    #[tokio::test]
    async fn test_retry_response_returned_verbatim() {
        let mut server = Server::new_async().await;
        let _orders = server
            .mock("GET", "/data/orders")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .with_status(200)
            .with_body(r#"{"access_token": "fresh"}"#)
            .expect(1)
            .create_async()
            .await;
        let _orders2 = server
            .mock("GET", "/data/orders")
            .match_header("authorization", "Bearer fresh")
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let (gateway, store, _session) = test_gateway(&server.url());
        store.put(keys::ACCESS_TOKEN, "stale").await.unwrap();
        store.put(keys::REFRESH_TOKEN, "refresh1").await.unwrap();

        let response = gateway
            .request("/data/orders", RequestOptions::get())
            .await
            .unwrap();
        refresh.assert_async().await;
        assert_eq!(response.status(), 403);
    }

    /// Test that a 401 with no refresh token clears everything without a
    /// refresh call and fails with SessionExpired.
    #[tokio::test]
    async fn test_401_without_refresh_token_expires_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/auth/me")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .expect(0)
            .create_async()
            .await;

        let (gateway, store, session) = test_gateway(&server.url());
        store.put(keys::ACCESS_TOKEN, "stale").await.unwrap();
        session.set_user(test_user());

        let err = gateway
            .request("/auth/me", RequestOptions::get())
            .await
            .unwrap_err();

        m.assert_async().await;
        refresh.assert_async().await;
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(store.get(keys::ACCESS_TOKEN).await.unwrap(), None);
        assert_eq!(store.get(keys::REFRESH_TOKEN).await.unwrap(), None);
        assert!(!session.is_authenticated());
    }

    /// Test that a rejected refresh clears the session with no replay of
    /// the original request.
    #[tokio::test]
    async fn test_rejected_refresh_expires_session() {
        let mut server = Server::new_async().await;
        let original = server
            .mock("GET", "/auth/me")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let (gateway, store, session) = test_gateway(&server.url());
        store.put(keys::ACCESS_TOKEN, "stale").await.unwrap();
        store.put(keys::REFRESH_TOKEN, "expired").await.unwrap();
        session.set_user(test_user());

        let err = gateway
            .request("/auth/me", RequestOptions::get())
            .await
            .unwrap_err();

        original.assert_async().await;
        refresh.assert_async().await;
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(store.get(keys::REFRESH_TOKEN).await.unwrap(), None);
        assert!(!session.is_authenticated());
    }

    /// Test that the refresh procedure makes no network call without a
    /// persisted refresh token.
    #[tokio::test]
    async fn test_refresh_without_token_skips_network() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/auth/refresh")
            .expect(0)
            .create_async()
            .await;

        let (gateway, _store, _session) = test_gateway(&server.url());

        let result = gateway.refresh_access_token().await;
        refresh.assert_async().await;
        assert!(result.is_err());
    }

    /// Test that a failed refresh leaves the persisted tokens untouched.
    #[tokio::test]
    async fn test_failed_refresh_does_not_mutate_state() {
        let mut server = Server::new_async().await;
        let _refresh = server
            .mock("POST", "/auth/refresh")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let (gateway, store, _session) = test_gateway(&server.url());
        store.put(keys::ACCESS_TOKEN, "stale").await.unwrap();
        store.put(keys::REFRESH_TOKEN, "refresh1").await.unwrap();

        let result = gateway.refresh_access_token().await;
        assert!(result.is_err());
        assert_eq!(
            store.get(keys::ACCESS_TOKEN).await.unwrap().as_deref(),
            Some("stale")
        );
        assert_eq!(
            store.get(keys::REFRESH_TOKEN).await.unwrap().as_deref(),
            Some("refresh1")
        );
    }

    /// Test that a connection failure surfaces as a transport error and is
    /// not retried.
    #[tokio::test]
    async fn test_transport_failure_propagates() {
        // Nothing listens on the discard port.
        let (gateway, _store, _session) = test_gateway("http://127.0.0.1:9");

        let err = gateway
            .request("/auth/me", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
