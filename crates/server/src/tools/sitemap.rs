//! sitemap tool implementation.
//!
//! Renders the public site's sitemap XML from the drug listing.

use chrono::{DateTime, Utc};
use drugbit_client::{CancelToken, DataClient, SitemapBuilder};
use drugbit_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::settle;

/// Parameters for the sitemap tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SitemapParams {
    /// RFC 3339 timestamp for every `<lastmod>` (default: now).
    #[serde(default)]
    pub lastmod: Option<String>,
}

fn parse_lastmod(raw: Option<&str>) -> Result<DateTime<Utc>, Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::InvalidInput(format!("invalid lastmod {s:?}: {e}"))),
    }
}

/// Implementation of the sitemap tool. Returns the XML document as text.
pub async fn sitemap_impl(client: &DataClient, site_url: &str, params: SitemapParams) -> Result<CallToolResult, McpError> {
    let lastmod = parse_lastmod(params.lastmod.as_deref())?;
    let drugs = settle(client.get_sitemap_drugs(&CancelToken::new()).await)?.unwrap_or_default();

    let xml = SitemapBuilder::new(site_url).with_lastmod(lastmod).render(&drugs)?;

    Ok(CallToolResult::success(vec![Content::text(xml)]))
}
