//! Cached, retrying, deduplicating access to the drug API.
//!
//! [`DataClient`] is the single entry point the UI layers use. Every operation:
//!
//! 1. validates the request and checks the TTL cache,
//! 2. joins an identical request already in flight, or starts one,
//! 3. retries rate limits and timeouts with exponential backoff,
//! 4. normalizes the response shape,
//! 5. caches the normalized payload and returns a [`FetchOutcome`].
//!
//! A cancelled caller stops waiting immediately. The underlying fetch keeps
//! running only while some other caller still waits on it, and nothing is
//! cached once every waiter has gone.

pub mod outcome;

pub use outcome::{FailureKind, FetchFailure, FetchOutcome};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use drugbit_core::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use drugbit_core::drug::{distinct_categories, sort_by_name};
use drugbit_core::{AppConfig, CacheStats, Drug, DrugRef, MAX_LIMIT, TtlCache};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::api::{
    ApiConfig, ApiError, ApiRequest, DrugApi, categories_from_value, drug_from_value, drugs_from_value,
};
use crate::cancel::CancelToken;
use crate::retry::RetryPolicy;
use crate::transport::Transport;

/// Default page size for single-page searches.
pub const DEFAULT_LIMIT: usize = 100;

/// Default page size used while paginating.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default cap on drugs accumulated by a paginated fetch.
pub const DEFAULT_MAX_TOTAL_DRUGS: usize = 1000;

/// Tuning for [`DataClient`].
#[derive(Debug, Clone)]
pub struct DataClientConfig {
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub retry: RetryPolicy,
    pub default_limit: usize,
    pub page_size: usize,
    pub max_total_drugs: usize,
}

impl Default for DataClientConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
            retry: RetryPolicy::default(),
            default_limit: DEFAULT_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            max_total_drugs: DEFAULT_MAX_TOTAL_DRUGS,
        }
    }
}

impl From<&AppConfig> for DataClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            cache_ttl: config.cache_ttl(),
            cache_capacity: config.cache_capacity,
            retry: RetryPolicy::from(config),
            default_limit: DEFAULT_LIMIT.min(config.max_total_drugs),
            page_size: config.page_size,
            max_total_drugs: config.max_total_drugs,
        }
    }
}

/// Options for [`DataClient::search_drugs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Page size; `None` uses the configured default.
    pub limit: Option<usize>,
    pub offset: usize,
    /// Paginate through every result instead of returning one page.
    pub fetch_all: bool,
}

impl SearchOptions {
    pub fn all() -> Self {
        Self { fetch_all: true, ..Self::default() }
    }

    pub fn page(limit: usize, offset: usize) -> Self {
        Self { limit: Some(limit), offset, fetch_all: false }
    }
}

/// Normalized payload as stored in the cache.
#[derive(Debug, Clone)]
enum Payload {
    Drugs(Vec<Drug>),
    Drug(Option<Drug>),
    Categories(Vec<String>),
}

impl Payload {
    fn decode(request: &ApiRequest, value: Value) -> Result<Self, ApiError> {
        match request {
            ApiRequest::Search { .. } | ApiRequest::Category(_) | ApiRequest::Sitemap => {
                drugs_from_value(value).map(Payload::Drugs)
            }
            ApiRequest::Drug(wanted) => drug_from_value(value, wanted).map(Payload::Drug),
            ApiRequest::Categories => categories_from_value(value).map(Payload::Categories),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Payload::Drugs(_) => "drug list",
            Payload::Drug(_) => "drug",
            Payload::Categories(_) => "category list",
        }
    }

    fn drugs(self) -> Result<Vec<Drug>, LoadError> {
        match self {
            Payload::Drugs(drugs) => Ok(drugs),
            other => Err(LoadError::unexpected("drug list", &other)),
        }
    }
}

/// Why [`DataClient::load`] produced no payload.
#[derive(Debug)]
enum LoadError {
    Canceled,
    Api(ApiError),
}

impl From<ApiError> for LoadError {
    fn from(err: ApiError) -> Self {
        LoadError::Api(err)
    }
}

impl LoadError {
    fn unexpected(wanted: &str, got: &Payload) -> Self {
        LoadError::Api(ApiError::Shape(format!("expected a {wanted}, cached a {}", got.kind())))
    }

    fn into_outcome<T>(self, operation: &str) -> FetchOutcome<T> {
        match self {
            LoadError::Canceled => {
                tracing::debug!(operation, "request cancelled");
                FetchOutcome::Canceled
            }
            LoadError::Api(err) => {
                let failure = FetchFailure::from(&err);
                tracing::error!(operation, kind = %failure.kind, "request failed: {}", err);
                FetchOutcome::Failed(failure)
            }
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Payload, ApiError>>>;

enum Lookup {
    Cached(Payload),
    Pending(SharedFetch),
}

struct Inner {
    transport: Arc<dyn Transport>,
    cache: TtlCache<Payload>,
    inflight: Mutex<HashMap<String, WeakShared<BoxFuture<'static, Result<Payload, ApiError>>>>>,
    config: DataClientConfig,
}

impl Inner {
    /// One request with retries, with a 404 on a single drug read as "no such drug".
    async fn fetch(&self, request: &ApiRequest) -> Result<Payload, ApiError> {
        let result = self.config.retry.run(request.endpoint(), move |_| self.transport.get(request)).await;
        match result {
            Ok(value) => Payload::decode(request, value),
            Err(ApiError::NotFound(_)) if matches!(request, ApiRequest::Drug(_)) => Ok(Payload::Drug(None)),
            Err(err) => Err(err),
        }
    }

    /// Cached payload, or a handle on the fetch that will produce it.
    async fn lookup(self: &Arc<Self>, request: ApiRequest) -> Lookup {
        let key = request.cache_key();
        let mut inflight = self.inflight.lock().await;

        if let Some(payload) = self.cache.get(&key).await {
            tracing::debug!(endpoint = request.endpoint(), "cache hit");
            return Lookup::Cached(payload);
        }

        if let Some(existing) = inflight.get(&key).and_then(WeakShared::upgrade) {
            tracing::debug!(endpoint = request.endpoint(), "joining in-flight request");
            return Lookup::Pending(existing);
        }

        tracing::debug!(endpoint = request.endpoint(), "cache miss");
        let inner = Arc::clone(self);
        let fetch_key = key.clone();
        let fetch = async move {
            let result = inner.fetch(&request).await;
            let mut inflight = inner.inflight.lock().await;
            if let Ok(payload) = &result {
                inner.cache.insert(fetch_key.clone(), payload.clone()).await;
            }
            inflight.remove(&fetch_key);
            result
        }
        .boxed()
        .shared();

        if let Some(weak) = fetch.downgrade() {
            inflight.insert(key, weak);
        }
        Lookup::Pending(fetch)
    }
}

/// Drug data access for the site and its tools.
///
/// Cheap to clone; clones share one cache and one in-flight table.
#[derive(Clone)]
pub struct DataClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient").field("config", &self.inner.config).finish_non_exhaustive()
    }
}

impl DataClient {
    pub fn new(transport: impl Transport + 'static, config: DataClientConfig) -> Self {
        let cache = TtlCache::new(config.cache_ttl, config.cache_capacity);
        Self {
            inner: Arc::new(Inner {
                transport: Arc::new(transport),
                cache,
                inflight: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Client backed by the HTTP API described by `config`.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ApiError> {
        let api = DrugApi::new(ApiConfig::from(config))?;
        Ok(Self::new(api, DataClientConfig::from(config)))
    }

    pub fn config(&self) -> &DataClientConfig {
        &self.inner.config
    }

    async fn load(&self, request: ApiRequest, cancel: &CancelToken) -> Result<Payload, LoadError> {
        if cancel.is_canceled() {
            return Err(LoadError::Canceled);
        }
        request.validate()?;

        let fetch = match self.inner.lookup(request).await {
            Lookup::Cached(payload) => return Ok(payload),
            Lookup::Pending(fetch) => fetch,
        };

        tokio::select! {
            biased;
            _ = cancel.canceled() => Err(LoadError::Canceled),
            result = fetch => result.map_err(LoadError::Api),
        }
    }

    /// Search drugs by name. An empty query lists every drug.
    ///
    /// With [`SearchOptions::fetch_all`] the listing is paginated from offset 0
    /// until a short page or the configured cap, and truncated to the cap.
    pub async fn search_drugs(&self, query: &str, options: SearchOptions, cancel: &CancelToken) -> FetchOutcome<Vec<Drug>> {
        if options.fetch_all {
            return self.fetch_all(query, cancel).await;
        }

        let limit = options.limit.unwrap_or(self.inner.config.default_limit);
        let request = ApiRequest::search(query, limit, options.offset);
        match self.load(request, cancel).await.and_then(Payload::drugs) {
            Ok(drugs) => FetchOutcome::from_list(drugs),
            Err(err) => err.into_outcome("search_drugs"),
        }
    }

    async fn fetch_all(&self, query: &str, cancel: &CancelToken) -> FetchOutcome<Vec<Drug>> {
        let page_size = self.inner.config.page_size.clamp(1, MAX_LIMIT);
        let cap = self.inner.config.max_total_drugs;
        let mut drugs = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let request = ApiRequest::search(query, page_size, offset);
            let page = match self.load(request, cancel).await.and_then(Payload::drugs) {
                Ok(page) => page,
                Err(err) => return err.into_outcome("search_drugs"),
            };
            pages += 1;

            let short = page.len() < page_size;
            drugs.extend(page);
            if short || drugs.len() >= cap {
                break;
            }
            offset += page_size;
        }

        if drugs.len() >= cap {
            tracing::warn!(cap, pages, "paginated fetch stopped at the safety cap");
        }
        drugs.truncate(cap);
        tracing::debug!(total = drugs.len(), pages, "paginated fetch complete");
        FetchOutcome::from_list(drugs)
    }

    /// One drug by numeric id or by name.
    ///
    /// A missing drug is [`FetchOutcome::Empty`], and that answer is cached too.
    pub async fn get_drug(&self, identifier: &str, cancel: &CancelToken) -> FetchOutcome<Drug> {
        let request = ApiRequest::Drug(DrugRef::parse(identifier));
        match self.load(request, cancel).await {
            Ok(Payload::Drug(drug)) => drug.into(),
            Ok(other) => LoadError::unexpected("drug", &other).into_outcome("get_drug"),
            Err(err) => err.into_outcome("get_drug"),
        }
    }

    /// Distinct category labels, sorted.
    ///
    /// Derived from the full listing when the backend has no categories endpoint.
    pub async fn get_categories(&self, cancel: &CancelToken) -> FetchOutcome<Vec<String>> {
        match self.load(ApiRequest::Categories, cancel).await {
            Ok(Payload::Categories(labels)) => FetchOutcome::from_list(distinct_categories(labels.iter().map(String::as_str))),
            Ok(other) => LoadError::unexpected("category list", &other).into_outcome("get_categories"),
            Err(LoadError::Api(err)) if err.is_not_found() => {
                tracing::warn!("categories endpoint unavailable, deriving from the full listing");
                self.fetch_all("", cancel)
                    .await
                    .and_then(|drugs| FetchOutcome::from_list(distinct_categories(drugs.iter().map(|d| d.category.as_str()))))
            }
            Err(err) => err.into_outcome("get_categories"),
        }
    }

    /// Drugs whose category matches `category` ignoring case, sorted by name.
    pub async fn get_drugs_by_category(&self, category: &str, cancel: &CancelToken) -> FetchOutcome<Vec<Drug>> {
        let category = category.trim();
        let request = ApiRequest::Category(category.to_string());
        let listing = match self.load(request, cancel).await.and_then(Payload::drugs) {
            Ok(drugs) => FetchOutcome::Data(drugs),
            Err(LoadError::Api(err)) if err.is_not_found() => {
                tracing::warn!(category, "category endpoint unavailable, filtering the full listing");
                self.fetch_all("", cancel).await
            }
            Err(err) => err.into_outcome("get_drugs_by_category"),
        };

        listing.and_then(|drugs| {
            let mut matching: Vec<Drug> = drugs.into_iter().filter(|d| d.in_category(category)).collect();
            sort_by_name(&mut matching);
            FetchOutcome::from_list(matching)
        })
    }

    /// Minimal drug listing (name and optional url) for sitemap generation.
    ///
    /// Falls back to the paginated search listing when the sitemap endpoint fails.
    pub async fn get_sitemap_drugs(&self, cancel: &CancelToken) -> FetchOutcome<Vec<Drug>> {
        let listing = match self.load(ApiRequest::Sitemap, cancel).await.and_then(Payload::drugs) {
            Ok(drugs) => FetchOutcome::from_list(drugs),
            Err(LoadError::Canceled) => return FetchOutcome::Canceled,
            Err(LoadError::Api(err)) => {
                tracing::warn!("sitemap endpoint failed ({}), falling back to the search listing", err);
                self.fetch_all("", cancel).await
            }
        };

        listing.map(|drugs| drugs.into_iter().map(|d| Drug { url: d.url, ..Drug::named(d.id, d.name) }).collect())
    }

    /// Drop expired cache entries and finished in-flight handles.
    pub async fn purge_expired(&self) -> usize {
        let mut inflight = self.inner.inflight.lock().await;
        inflight.retain(|_, weak| weak.upgrade().is_some());
        drop(inflight);

        let purged = self.inner.cache.purge_expired().await;
        tracing::info!(purged, "purged expired cache entries");
        purged
    }

    pub async fn clear_cache(&self) -> usize {
        let cleared = self.inner.cache.clear().await;
        tracing::info!(cleared, "cleared cache");
        cleared
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats().await
    }

    /// Number of distinct requests currently in flight.
    pub async fn inflight_count(&self) -> usize {
        let inflight = self.inner.inflight.lock().await;
        inflight.values().filter(|weak| weak.upgrade().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(Value);

    #[async_trait]
    impl Transport for Fixed {
        async fn get(&self, _request: &ApiRequest) -> Result<Value, ApiError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig { page_size: 50, max_total_drugs: 200, cache_ttl_secs: 60, ..Default::default() };
        let config = DataClientConfig::from(&app);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.max_total_drugs, 200);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.default_limit, 100);
    }

    #[test]
    fn test_search_options() {
        assert!(SearchOptions::all().fetch_all);
        assert_eq!(SearchOptions::page(10, 20), SearchOptions { limit: Some(10), offset: 20, fetch_all: false });
        assert_eq!(SearchOptions::default().limit, None);
    }

    #[test]
    fn test_payload_decode_by_request() {
        let drugs = json!([{"id": 1, "name": "Propofol"}]);
        assert!(matches!(
            Payload::decode(&ApiRequest::search("", 10, 0), drugs.clone()),
            Ok(Payload::Drugs(d)) if d.len() == 1
        ));
        assert!(matches!(
            Payload::decode(&ApiRequest::Drug(DrugRef::Id(1)), drugs),
            Ok(Payload::Drug(Some(d))) if d.name == "Propofol"
        ));
        assert!(matches!(
            Payload::decode(&ApiRequest::Categories, json!(["A", "B"])),
            Ok(Payload::Categories(c)) if c.len() == 2
        ));
        assert!(matches!(Payload::decode(&ApiRequest::Sitemap, json!("nope")), Err(ApiError::Shape(_))));
    }

    #[tokio::test]
    async fn test_invalid_request_fails_without_transport() {
        let client = DataClient::new(Fixed(json!([])), DataClientConfig::default());
        let outcome = client.get_drug("  ", &CancelToken::new()).await;
        assert!(matches!(outcome, FetchOutcome::Failed(FetchFailure { kind: FailureKind::InvalidRequest, .. })));
    }

    #[tokio::test]
    async fn test_precanceled_token() {
        let client = DataClient::new(Fixed(json!([])), DataClientConfig::default());
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(client.get_categories(&cancel).await.is_canceled());
        assert_eq!(client.cache_stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_sitemap_listing_is_minimal() {
        let body = json!([{"id": 3, "name": "Ketamine", "category": "Induction", "url": "https://x/k"}]);
        let client = DataClient::new(Fixed(body), DataClientConfig::default());
        let drugs = client.get_sitemap_drugs(&CancelToken::new()).await.into_data_or_default();
        assert_eq!(drugs.len(), 1);
        assert_eq!(drugs[0].name, "Ketamine");
        assert_eq!(drugs[0].url.as_deref(), Some("https://x/k"));
        assert!(drugs[0].category.is_empty());
    }
}
