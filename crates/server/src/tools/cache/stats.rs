//! cache_stats tool implementation.

use drugbit_client::DataClient;
use drugbit_core::CacheStats;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_stats tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsParams {}

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsOutput {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub ttl_secs: u64,
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(client: &DataClient, _params: CacheStatsParams) -> Result<CallToolResult, McpError> {
    let stats = client.cache_stats().await;
    json_result(&CacheStatsOutput { stats, ttl_secs: client.config().cache_ttl.as_secs() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{catalogue, text};
    use drugbit_client::CancelToken;

    #[tokio::test]
    async fn test_stats_count_hits_and_misses() {
        let client = catalogue();
        let cancel = CancelToken::new();
        client.get_categories(&cancel).await;
        client.get_categories(&cancel).await;

        let result = stats_impl(&client, CacheStatsParams {}).await.unwrap();
        let output: serde_json::Value = serde_json::from_str(&text(&result)).unwrap();

        assert_eq!(output["entries"], 1);
        assert_eq!(output["hits"], 1);
        assert_eq!(output["misses"], 1);
        assert_eq!(output["ttl_secs"], 3600);
    }
}
