//! Drug API client error types.

use std::sync::Arc;

/// Errors from the remote drug-data API.
///
/// `Clone` so a single in-flight fetch can hand its error to every waiter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: HTTP {status}")]
    AuthError { status: u16 },

    /// The endpoint or record does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend (HTTP 429).
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP response.
    #[error("HTTP error: {status}{}", with_message(.message))]
    HttpError { status: u16, message: Option<String> },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body is not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response JSON does not have any accepted shape.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// Envelope reported `success: false`.
    #[error("backend error: {0}")]
    Backend(String),
}

fn with_message(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
}

impl ApiError {
    /// Whether a retry may succeed: rate limiting and timeouts only.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::RateLimited | ApiError::Timeout)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ApiError::Timeout } else { ApiError::Network(Arc::new(err)) }
    }
}
