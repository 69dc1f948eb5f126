use thiserror::Error;

/// Failure taxonomy for the authentication flow and the request gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials. Surfaced to the user; the session is unchanged.
    #[error("{0}")]
    Authentication(String),
    /// The refresh procedure failed; the session has been cleared.
    #[error("Session expired, please sign in again")]
    SessionExpired,
    /// The network was unreachable or the connection failed. Never
    /// auto-retried.
    #[error("Network error: {0}")]
    Transport(String),
    /// A non-2xx response other than 401, with the server message when the
    /// body carried one.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// The persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(String),
    /// A response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The user-facing message for this failure, without status prefixes.
    pub fn message(&self) -> String {
        match self {
            ApiError::Authentication(message) => message.clone(),
            ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
