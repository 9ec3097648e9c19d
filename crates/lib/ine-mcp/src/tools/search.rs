use ine_core::Upstream;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{IneMcp, helpers};

/// Parameters for free-text search across operations and tables.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchDataParams {
    pub query: String,
    /// Restrict the search to operations whose code or name matches this text.
    pub operation_filter: Option<String>,
    /// Defaults to 10.
    pub max_results: Option<usize>,
}

/// Parameters for summarising the latest observations of an operation.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetLatestDataParams {
    pub operation_code: String,
    /// Table `Id` or `Codigo`; defaults to the first few tables.
    pub table_filter: Option<String>,
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl<U: Upstream> IneMcp<U> {
    #[tool(description = "Search operations and their tables by case- and accent-insensitive text.")]
    async fn search_data(
        &self,
        Parameters(params): Parameters<SearchDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let results = self
            .control()
            .search_data(
                &params.query,
                params.operation_filter.as_deref(),
                params.max_results,
            )
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(results)?]))
    }

    #[tool(description = "Summarise the most recent observation of each series in an operation's tables.")]
    async fn get_latest_data(
        &self,
        Parameters(params): Parameters<GetLatestDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let records = self
            .control()
            .get_latest_data(&params.operation_code, params.table_filter.as_deref())
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(records)?]))
    }
}
