//! Remote drug-data API client.
//!
//! Provides a reqwest-backed [`Transport`] for the drug API, with request
//! validation and status classification.
//!
//! ### Contract
//!
//! - **Base URL**: `DRUGBIT_API_URL` (default `https://data.drugbit.info`)
//! - **Authentication**: none, except the sitemap endpoint which takes an
//!   `X-API-Key` header when a key is configured.
//! - **Errors**: non-2xx responses with an optional `{success: false, message}` body.
//!   401/403 map to [`ApiError::AuthError`], 404 to [`ApiError::NotFound`],
//!   429 to [`ApiError::RateLimited`].
//! - **Timeout**: every call is bounded by the client-side timeout (default 10s).

pub mod error;
pub mod request;
pub mod response;

pub use error::ApiError;
pub use request::ApiRequest;
pub use response::{RawDrug, categories_from_value, drug_from_value, drugs_from_value};

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use drugbit_core::AppConfig;
use reqwest::{StatusCode, header};
use serde_json::Value;

use crate::transport::Transport;

/// Default base URL for the drug API.
const DEFAULT_BASE_URL: &str = "https://data.drugbit.info";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "drugbit/0.1";

/// Header carrying the sitemap API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Drug API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL (default: https://data.drugbit.info).
    pub base_url: String,
    /// API key for the sitemap endpoint.
    pub sitemap_key: Option<String>,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: drugbit/0.x).
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sitemap_key: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for ApiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            sitemap_key: config.sitemap_key().map(str::to_string),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Drug API client.
#[derive(Debug, Clone)]
pub struct DrugApi {
    http: reqwest::Client,
    config: ApiConfig,
}

impl DrugApi {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL {}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), request.path())
    }
}

/// Pull `message` out of a `{success: false, message}` error body.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("message").and_then(Value::as_str).map(str::to_string)
}

/// Map a non-success status onto an [`ApiError`].
fn classify_status(status: StatusCode, path: &str, body: &[u8]) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::AuthError { status: status.as_u16() },
        StatusCode::NOT_FOUND => ApiError::NotFound(error_message(body).unwrap_or_else(|| path.to_string())),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        _ => ApiError::HttpError { status: status.as_u16(), message: error_message(body) },
    }
}

#[async_trait]
impl Transport for DrugApi {
    async fn get(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        request.validate()?;

        let start = Instant::now();
        let url = self.url_for(request);

        tracing::debug!(endpoint = request.endpoint(), "requesting {}", url);

        let mut builder = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&request.query());

        if request.needs_api_key()
            && let Some(key) = &self.config.sitemap_key
        {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let http_response = builder.send().await?;

        let status = http_response.status();
        tracing::debug!("drug API response status: {}", status);

        let bytes = http_response.bytes().await?;

        if !status.is_success() {
            return Err(classify_status(status, &request.path(), &bytes));
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))?;

        tracing::debug!(endpoint = request.endpoint(), "request completed in {:?}", start.elapsed());

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig {
            api_url: "http://localhost:8000".into(),
            sitemap_key: Some("secret".into()),
            timeout_ms: 5000,
            ..Default::default()
        };
        let config = ApiConfig::from(&app);
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.sitemap_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "drugbit/0.1");
    }

    #[test]
    fn test_client_new_invalid_base_url() {
        let config = ApiConfig { base_url: "not a url".into(), ..Default::default() };
        assert!(matches!(DrugApi::new(config), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let api = DrugApi::new(ApiConfig { base_url: "http://localhost:8000/".into(), ..Default::default() }).unwrap();
        assert_eq!(api.url_for(&ApiRequest::Categories), "http://localhost:8000/drugs/categories");
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(classify_status(StatusCode::TOO_MANY_REQUESTS, "/", b""), ApiError::RateLimited));
        assert!(matches!(classify_status(StatusCode::FORBIDDEN, "/", b""), ApiError::AuthError { status: 403 }));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "/drugs/x", b""),
            ApiError::NotFound(path) if path == "/drugs/x"
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "/", br#"{"success":false,"message":"boom"}"#),
            ApiError::HttpError { status: 500, message: Some(msg) } if msg == "boom"
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "/", b"<html>"),
            ApiError::HttpError { status: 502, message: None }
        ));
        assert!(matches!(
            classify_status(StatusCode::REQUEST_TIMEOUT, "/", b""),
            ApiError::HttpError { status: 408, .. }
        ));
    }
}
