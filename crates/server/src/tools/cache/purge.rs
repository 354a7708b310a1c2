//! cache_purge tool implementation.
//!
//! Drops expired cache entries, or every entry when `all` is set.

use drugbit_client::DataClient;
use drugbit_core::CacheStats;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove every entry, not only expired ones.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: usize,
    /// Entries left after the purge.
    pub remaining: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(client: &DataClient, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let deleted = if params.all { client.clear_cache().await } else { client.purge_expired().await };
    let CacheStats { entries: remaining, .. } = client.cache_stats().await;

    json_result(&CachePurgeOutput { deleted, remaining })
}
