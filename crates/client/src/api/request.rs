//! Drug API request types and validation.

use drugbit_core::{DrugRef, MAX_LIMIT, compute_cache_key};

use crate::api::ApiError;

/// One call against the remote drug-data API.
///
/// Endpoints:
/// - `GET /drugs/?search=<q>&limit=<n>&offset=<n>`
/// - `GET /drugs/<id-or-name>`
/// - `GET /drugs/categories`
/// - `GET /drugs/category/<name>`
/// - `GET /drugs/sitemap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Page of search results. An empty query lists every drug.
    Search { query: String, limit: usize, offset: usize },
    /// Single drug by id or name.
    Drug(DrugRef),
    /// Distinct category labels.
    Categories,
    /// Every drug in one category.
    Category(String),
    /// Minimal listing for sitemap generation.
    Sitemap,
}

impl ApiRequest {
    pub fn search(query: &str, limit: usize, offset: usize) -> Self {
        ApiRequest::Search { query: query.trim().to_string(), limit, offset }
    }

    /// Endpoint template, used for logging and cache keys.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiRequest::Search { .. } => "/drugs/",
            ApiRequest::Drug(_) => "/drugs/{ref}",
            ApiRequest::Categories => "/drugs/categories",
            ApiRequest::Category(_) => "/drugs/category/{name}",
            ApiRequest::Sitemap => "/drugs/sitemap",
        }
    }

    /// Request path relative to the API base URL, with path segments percent-encoded.
    pub fn path(&self) -> String {
        match self {
            ApiRequest::Search { .. } => "/drugs/".to_string(),
            ApiRequest::Drug(drug_ref) => format!("/drugs/{}", urlencoding::encode(&drug_ref.to_string())),
            ApiRequest::Categories => "/drugs/categories".to_string(),
            ApiRequest::Category(name) => format!("/drugs/category/{}", urlencoding::encode(name.trim())),
            ApiRequest::Sitemap => "/drugs/sitemap".to_string(),
        }
    }

    /// Query string parameters. An empty search term is omitted.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ApiRequest::Search { query, limit, offset } => {
                let mut params = Vec::with_capacity(3);
                if !query.is_empty() {
                    params.push(("search", query.clone()));
                }
                params.push(("limit", limit.to_string()));
                params.push(("offset", offset.to_string()));
                params
            }
            _ => Vec::new(),
        }
    }

    /// Whether the request carries the sitemap API key.
    pub fn needs_api_key(&self) -> bool {
        matches!(self, ApiRequest::Sitemap)
    }

    /// Deterministic cache key for this request.
    ///
    /// Names and categories are matched case-insensitively by the backend,
    /// so they are lowercased here to share one entry.
    pub fn cache_key(&self) -> String {
        let params = match self {
            ApiRequest::Search { query, limit, offset } => {
                vec![("search", query.clone()), ("limit", limit.to_string()), ("offset", offset.to_string())]
            }
            ApiRequest::Drug(DrugRef::Id(id)) => vec![("id", id.to_string())],
            ApiRequest::Drug(DrugRef::Name(name)) => vec![("name", name.to_lowercase())],
            ApiRequest::Category(name) => vec![("category", name.trim().to_lowercase())],
            ApiRequest::Categories | ApiRequest::Sitemap => Vec::new(),
        };
        compute_cache_key(self.endpoint(), &params)
    }

    /// Validate the request parameters.
    ///
    /// Returns an error if any parameters are out of range or empty.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            ApiRequest::Search { query, limit, .. } => {
                if *limit == 0 || *limit > MAX_LIMIT {
                    return Err(ApiError::InvalidRequest(format!("limit must be 1-{MAX_LIMIT}, got {limit}")));
                }
                if query.chars().count() > 200 {
                    return Err(ApiError::InvalidRequest("search query too long (max 200 chars)".into()));
                }
            }
            ApiRequest::Drug(drug_ref) => {
                if drug_ref.is_empty() {
                    return Err(ApiError::InvalidRequest("drug identifier cannot be empty".into()));
                }
            }
            ApiRequest::Category(name) => {
                if name.trim().is_empty() {
                    return Err(ApiError::InvalidRequest("category cannot be empty".into()));
                }
            }
            ApiRequest::Categories | ApiRequest::Sitemap => {}
        }
        Ok(())
    }
}
