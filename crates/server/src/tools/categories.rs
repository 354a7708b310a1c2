//! drug_categories and drug_by_category tool implementations.

use drugbit_client::{CancelToken, DataClient};
use drugbit_core::{Drug, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{json_result, settle};

/// Parameters for the drug_categories tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DrugCategoriesParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrugCategoriesOutput {
    pub categories: Vec<String>,
}

/// Parameters for the drug_by_category tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DrugByCategoryParams {
    /// Category label, matched case-insensitively.
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrugByCategoryOutput {
    pub category: String,
    pub count: usize,
    pub drugs: Vec<Drug>,
}

pub async fn categories_impl(client: &DataClient, _params: DrugCategoriesParams) -> Result<CallToolResult, McpError> {
    let categories = settle(client.get_categories(&CancelToken::new()).await)?.unwrap_or_default();
    json_result(&DrugCategoriesOutput { categories })
}

pub async fn by_category_impl(client: &DataClient, params: DrugByCategoryParams) -> Result<CallToolResult, McpError> {
    let category = params.category.trim();
    if category.is_empty() {
        return Err(Error::InvalidInput("category cannot be empty".into()).into());
    }

    let drugs = settle(client.get_drugs_by_category(category, &CancelToken::new()).await)?.unwrap_or_default();

    json_result(&DrugByCategoryOutput { category: category.to_string(), count: drugs.len(), drugs })
}
