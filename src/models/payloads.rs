use serde::{Deserialize, Serialize};

use super::user::User;

/// Successful response body of POST /auth/login.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Successful response body of POST /auth/refresh. The refresh token is not
/// rotated, so only the new access token comes back.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Successful response body of GET /auth/me.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MeResponse {
    pub user: User,
}

/// Error body shape shared by the auth endpoints.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiMessage {
    pub message: String,
}
