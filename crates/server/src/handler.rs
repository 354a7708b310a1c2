//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    CachePurgeParams, CacheStatsParams, DrugByCategoryParams, DrugCategoriesParams, DrugGetParams, DrugSearchParams,
    SitemapParams, cache, categories, drugs, sitemap,
};

use drugbit_client::DataClient;
use drugbit_core::AppConfig;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for drugbit.
#[derive(Clone)]
pub struct DrugbitServer {
    client: DataClient,
    config: Arc<AppConfig>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl DrugbitServer {
    /// Create a new server handler around a shared data client.
    pub fn new(client: DataClient, config: AppConfig) -> Self {
        Self { client, config: Arc::new(config), tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Search the drug database by name. Empty query lists every drug; set fetch_all to page through all results (capped)."
    )]
    async fn drug_search(&self, params: Parameters<DrugSearchParams>) -> Result<CallToolResult, McpError> {
        drugs::search_impl(&self.client, params.0).await
    }

    #[tool(
        description = "Get one drug's full reference record (dosing, pharmacokinetics, pharmacodynamics, clinical notes) by numeric id or exact name."
    )]
    async fn drug_get(&self, params: Parameters<DrugGetParams>) -> Result<CallToolResult, McpError> {
        drugs::get_impl(&self.client, params.0).await
    }

    #[tool(description = "List the distinct drug categories, sorted.")]
    async fn drug_categories(&self, params: Parameters<DrugCategoriesParams>) -> Result<CallToolResult, McpError> {
        categories::categories_impl(&self.client, params.0).await
    }

    #[tool(description = "List drugs in a category (case-insensitive), sorted by name.")]
    async fn drug_by_category(&self, params: Parameters<DrugByCategoryParams>) -> Result<CallToolResult, McpError> {
        categories::by_category_impl(&self.client, params.0).await
    }

    /// Render the sitemap for the configured public site.
    #[tool(description = "Render the public site's sitemap.xml covering static pages and every drug page.")]
    async fn sitemap(&self, params: Parameters<SitemapParams>) -> Result<CallToolResult, McpError> {
        sitemap::sitemap_impl(&self.client, &self.config.site_url, params.0).await
    }

    #[tool(description = "Purge expired cache entries, or every entry with all=true.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.client, params.0).await
    }

    #[tool(description = "Report response cache size, capacity, hits, misses and evictions.")]
    async fn cache_stats(&self, params: Parameters<CacheStatsParams>) -> Result<CallToolResult, McpError> {
        cache::stats_impl(&self.client, params.0).await
    }
}

impl ServerHandler for DrugbitServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "drugbit".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Pharmacology reference lookups. Search or list drugs, then fetch a full record with drug_get.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::catalogue;

    #[test]
    fn test_lists_every_tool() {
        let server = DrugbitServer::new(catalogue(), AppConfig::default());
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "cache_purge",
                "cache_stats",
                "drug_by_category",
                "drug_categories",
                "drug_get",
                "drug_search",
                "sitemap"
            ]
        );
    }

    #[test]
    fn test_server_info() {
        let server = DrugbitServer::new(catalogue(), AppConfig::default());
        let info = server.get_info();
        assert_eq!(info.server_info.name, "drugbit");
        assert!(info.capabilities.tools.is_some());
    }
}
