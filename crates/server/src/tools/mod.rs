//! MCP tool implementations.
//!
//! This module contains all tools exposed by the drugbit server.

pub mod cache;
pub mod categories;
pub mod drugs;
pub mod sitemap;

pub use cache::{CachePurgeParams, CacheStatsParams};
pub use categories::{DrugByCategoryParams, DrugCategoriesParams};
pub use drugs::{DrugGetParams, DrugSearchParams};
pub use sitemap::SitemapParams;

use drugbit_client::FetchOutcome;
use drugbit_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Pretty JSON tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Data or `None` for an empty result; failures and cancellation become MCP errors.
pub(crate) fn settle<T>(outcome: FetchOutcome<T>) -> Result<Option<T>, McpError> {
    Ok(outcome.into_result()?)
}
