//! drug_search and drug_get tool implementations.

use drugbit_client::{CancelToken, DataClient, SearchOptions};
use drugbit_core::{Drug, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{json_result, settle};

/// Input parameters for drug_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DrugSearchParams {
    /// Search text matched against drug names. Empty lists every drug.
    #[serde(default)]
    pub query: String,

    /// Page size (1-1000, default 100).
    #[serde(default)]
    pub limit: Option<usize>,

    /// Number of results to skip (default 0).
    #[serde(default)]
    pub offset: Option<usize>,

    /// Page through every result instead of returning one page.
    #[serde(default)]
    pub fetch_all: bool,
}

/// Output structure for drug_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrugSearchOutput {
    pub query: String,
    pub count: usize,
    pub drugs: Vec<Drug>,
}

/// Input parameters for drug_get tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DrugGetParams {
    /// Numeric drug id or exact drug name (case-insensitive).
    pub identifier: String,
}

/// Output structure for drug_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrugGetOutput {
    pub identifier: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug: Option<Drug>,
}

/// Implementation of the drug_search tool.
pub async fn search_impl(client: &DataClient, params: DrugSearchParams) -> Result<CallToolResult, McpError> {
    let options = SearchOptions { limit: params.limit, offset: params.offset.unwrap_or(0), fetch_all: params.fetch_all };
    let drugs = settle(client.search_drugs(&params.query, options, &CancelToken::new()).await)?.unwrap_or_default();

    tracing::debug!(query = %params.query, count = drugs.len(), "drug_search");

    json_result(&DrugSearchOutput { query: params.query, count: drugs.len(), drugs })
}

/// Implementation of the drug_get tool.
pub async fn get_impl(client: &DataClient, params: DrugGetParams) -> Result<CallToolResult, McpError> {
    let identifier = params.identifier.trim();
    if identifier.is_empty() {
        return Err(Error::InvalidInput("identifier cannot be empty".into()).into());
    }

    let drug = settle(client.get_drug(identifier, &CancelToken::new()).await)?;

    json_result(&DrugGetOutput { identifier: identifier.to_string(), found: drug.is_some(), drug })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{catalogue, client, text};
    use drugbit_client::ApiError;

    #[tokio::test]
    async fn test_search_all() {
        let params = DrugSearchParams { fetch_all: true, ..Default::default() };

        let result = search_impl(&catalogue(), params).await.unwrap();
        let output: DrugSearchOutput = serde_json::from_str(&text(&result)).unwrap();

        assert_eq!(output.count, 3);
        assert_eq!(output.drugs[0].name, "Propofol");
    }

    #[tokio::test]
    async fn test_search_empty_is_success() {
        let client = client(|_| Ok(serde_json::json!([])));
        let params = DrugSearchParams { query: "zzz".into(), ..Default::default() };

        let result = search_impl(&client, params).await.unwrap();
        let output: DrugSearchOutput = serde_json::from_str(&text(&result)).unwrap();

        assert_eq!(output.count, 0);
        assert!(output.drugs.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_is_error() {
        let client = client(|_| Err(ApiError::HttpError { status: 502, message: None }));
        let params = DrugSearchParams { query: "propofol".into(), ..Default::default() };

        let err = search_impl(&client, params).await.unwrap_err();
        assert_eq!(err.code.0, -32008);
    }

    #[tokio::test]
    async fn test_search_invalid_limit() {
        let params = DrugSearchParams { limit: Some(0), ..Default::default() };

        let err = search_impl(&catalogue(), params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_get_found() {
        let params = DrugGetParams { identifier: "Propofol".into() };

        let result = get_impl(&catalogue(), params).await.unwrap();
        let output: DrugGetOutput = serde_json::from_str(&text(&result)).unwrap();

        assert!(output.found);
        assert_eq!(output.drug.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let params = DrugGetParams { identifier: "Nonexistent".into() };

        let result = get_impl(&catalogue(), params).await.unwrap();
        let output: DrugGetOutput = serde_json::from_str(&text(&result)).unwrap();

        assert!(!output.found);
        assert!(output.drug.is_none());
    }

    #[tokio::test]
    async fn test_get_empty_identifier() {
        let params = DrugGetParams { identifier: "  ".into() };
        assert!(get_impl(&catalogue(), params).await.is_err());
    }
}
