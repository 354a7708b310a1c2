//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (DRUGBIT_*)
//! 2. TOML config file (if DRUGBIT_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Values are read once at startup and treated as constants afterwards.

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DRUGBIT_*)
/// 2. TOML config file (if DRUGBIT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote drug-data API.
    ///
    /// Set via DRUGBIT_API_URL environment variable.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Public site base URL used for generated links.
    ///
    /// Set via DRUGBIT_SITE_URL environment variable.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// API key sent to the sitemap endpoint.
    ///
    /// Set via DRUGBIT_SITEMAP_KEY environment variable.
    #[serde(default)]
    pub sitemap_key: Option<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via DRUGBIT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via DRUGBIT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lifetime of a cache entry in seconds.
    ///
    /// Set via DRUGBIT_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of cached responses.
    ///
    /// Set via DRUGBIT_CACHE_CAPACITY environment variable.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Attempts per request, including the first.
    ///
    /// Set via DRUGBIT_MAX_ATTEMPTS environment variable.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds; doubled on each retry.
    ///
    /// Set via DRUGBIT_RETRY_BASE_DELAY_MS environment variable.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Page size used when fetching every drug.
    ///
    /// Set via DRUGBIT_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound on drugs accumulated by a fetch-all.
    ///
    /// Set via DRUGBIT_MAX_TOTAL_DRUGS environment variable.
    #[serde(default = "default_max_total_drugs")]
    pub max_total_drugs: usize,
}

fn default_api_url() -> String {
    "https://data.drugbit.info".into()
}

fn default_site_url() -> String {
    "https://www.drugbit.info".into()
}

fn default_user_agent() -> String {
    "drugbit/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    3000
}

fn default_page_size() -> usize {
    100
}

fn default_max_total_drugs() -> usize {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            site_url: default_site_url(),
            sitemap_key: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            page_size: default_page_size(),
            max_total_drugs: default_max_total_drugs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `DRUGBIT_`
    /// 2. TOML file from `DRUGBIT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("DRUGBIT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("DRUGBIT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Sitemap API key, if one is configured and non-blank.
    pub fn sitemap_key(&self) -> Option<&str> {
        self.sitemap_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, "https://data.drugbit.info");
        assert_eq!(config.site_url, "https://www.drugbit.info");
        assert_eq!(config.user_agent, "drugbit/0.1");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_base_delay_ms, 3000);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_total_drugs, 1000);
        assert!(config.sitemap_key.is_none());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.retry_base_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_sitemap_key_blank_is_none() {
        let config = AppConfig { sitemap_key: Some("  ".into()), ..Default::default() };
        assert!(config.sitemap_key().is_none());

        let config = AppConfig { sitemap_key: Some("secret".into()), ..Default::default() };
        assert_eq!(config.sitemap_key(), Some("secret"));
    }

    #[test]
    fn test_load_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "drugbit.toml",
                r#"
                api_url = "http://localhost:8000"
                page_size = 50
                max_total_drugs = 200
                "#,
            )?;
            jail.set_env("DRUGBIT_CONFIG_FILE", "drugbit.toml");
            jail.set_env("DRUGBIT_PAGE_SIZE", "25");
            jail.set_env("DRUGBIT_SITEMAP_KEY", "key-123");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.api_url, "http://localhost:8000");
            assert_eq!(config.page_size, 25);
            assert_eq!(config.max_total_drugs, 200);
            assert_eq!(config.sitemap_key(), Some("key-123"));
            assert_eq!(config.timeout_ms, 10_000);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DRUGBIT_MAX_ATTEMPTS", "0");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_attempts"));
            Ok(())
        });
    }
}
