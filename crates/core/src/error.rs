//! Unified error types for drugbit.
//!
//! Each variant renders as `CODE: detail` and maps to a stable MCP error code.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the drugbit surfaces.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty identifier).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The backend reported a failure in its response envelope.
    #[error("BACKEND_ERROR: {0}")]
    Backend(String),

    /// No such record.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// The backend answered with a shape that cannot be normalized.
    #[error("MALFORMED_RESPONSE: {0}")]
    MalformedResponse(String),

    /// Request timed out after retries.
    #[error("FETCH_TIMEOUT: {0}")]
    Timeout(String),

    /// Non-retryable HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Backend rejected the credentials.
    #[error("AUTH_ERROR: {0}")]
    AuthError(String),

    /// Backend kept rate limiting after retries.
    #[error("RATE_LIMITED: {0}")]
    RateLimited(String),

    /// Connection-level failure (DNS, refused, reset).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// The caller abandoned the request.
    #[error("CANCELED")]
    Canceled,

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),

    /// Sitemap could not be produced.
    #[error("SITEMAP_FAILED: {0}")]
    SitemapFailed(String),
}

impl Error {
    /// Stable numeric code used on the MCP surface.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) => -32602,
            Error::Backend(_) => -32000,
            Error::NotFound(_) => -32001,
            Error::MalformedResponse(_) => -32002,
            Error::Timeout(_) => -32006,
            Error::HttpError(_) => -32008,
            Error::AuthError(_) => -32009,
            Error::RateLimited(_) => -32010,
            Error::Network(_) => -32011,
            Error::Canceled => -32012,
            Error::Config(_) => -32014,
            Error::SitemapFailed(_) => -32015,
        }
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = err.code();
        let message = match &err {
            Error::InvalidInput(msg)
            | Error::Backend(msg)
            | Error::NotFound(msg)
            | Error::MalformedResponse(msg)
            | Error::Timeout(msg)
            | Error::HttpError(msg)
            | Error::AuthError(msg)
            | Error::RateLimited(msg)
            | Error::Network(msg)
            | Error::Config(msg)
            | Error::SitemapFailed(msg) => msg.clone(),
            Error::Canceled => "Request was canceled".to_string(),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("propofol".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("propofol"));
        assert_eq!(Error::Canceled.to_string(), "CANCELED");
    }

    #[test]
    fn test_error_to_mcp_error() {
        let mcp_err: McpError = Error::RateLimited("429 after 3 attempts".to_string()).into();
        assert_eq!(mcp_err.code.0, -32010);
        assert_eq!(mcp_err.message, "429 after 3 attempts");

        let mcp_err: McpError = Error::Canceled.into();
        assert_eq!(mcp_err.code.0, -32012);
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = crate::config::ConfigError::LoadFailed("bad toml".into()).into();
        assert!(matches!(err, Error::Config(msg) if msg.contains("bad toml")));
    }
}
