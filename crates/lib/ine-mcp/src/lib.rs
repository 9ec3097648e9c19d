//! MCP server implementation for ine-mcp.
//!
//! This crate wires the INE control plane into rmcp tool handlers and exposes
//! the catalog, data, search and help tools.

mod helpers;
mod tools;
pub mod server;

use ine_core::{HttpUpstream, IneControlPlane, Upstream};
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

pub use tools::catalog::{
    GetOperationTablesParams,
    GetTableVariablesParams,
    GetVariableValuesParams,
    ListOperationsParams,
};
pub use tools::data::{GetSeriesDataParams, GetTableDataParams};
pub use tools::search::{GetLatestDataParams, SearchDataParams};

const SERVER_INSTRUCTIONS: &str = r#"ine-mcp provides MCP tools over the public JSON API of the Spanish National Statistics Institute (INE).

Workflow:
1. Find an operation (survey or indicator family). Call `list_operations` with an optional
   `filter_text` such as `IPC` or `poblacion`, or `search_data` with free text.
2. List its tables with `get_operation_tables` using the operation `Codigo` (e.g. `IPC`, `EPA`, `IPV`).
3. Inspect a table:
   - `get_table_variables` lists the selection variables of a table.
   - `get_variable_values` lists the values of one variable within a table.
4. Fetch data:
   - `get_table_data` returns every series of a table with its observations.
   - `get_series_data` returns one series by `COD`, or `{"error": ...}` when it does not exist.
   - `get_latest_data` summarises the latest observation of each series in an operation's tables.

Notes:
- Matching is case- and accent-insensitive (`poblacion` finds `Población`).
- `last_periods` limits each series to its N most recent observations.
- `period_type` accepts monthly, quarterly, semiannual or annual (see `periodicity_help`).
- `date_range` is `YYYYMMDD:YYYYMMDD`; `detail_level` is 0, 1 or 2.
- `Fecha` values are Unix epoch milliseconds; `Valor` may be null for missing observations.
- Unknown identifiers return empty lists; upstream outages are reported as tool errors.
- Use `help` for the tool list. `health` returns `ok`."#;

/// MCP server wrapper around the control plane and tool routers.
pub struct IneMcp<U: Upstream = HttpUpstream> {
    tool_router: ToolRouter<Self>,
    control: IneControlPlane<U>,
}

impl<U: Upstream> Clone for IneMcp<U> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            control: self.control.clone(),
        }
    }
}

impl<U: Upstream> IneMcp<U> {
    /// Creates a new server around a control plane.
    #[must_use]
    pub fn new(control: IneControlPlane<U>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_catalog()
            + Self::tool_router_data()
            + Self::tool_router_search()
            + Self::tool_router_context();
        Self {
            tool_router,
            control,
        }
    }

    pub(crate) const fn control(&self) -> &IneControlPlane<U> {
        &self.control
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<U: Upstream> IneMcp<U> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl<U: Upstream> ServerHandler for IneMcp<U> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use ine_core::upstream::{Upstream, UpstreamRequest, UpstreamResponse};
    use ine_core::{IneControlPlane, IneResult};
    use rmcp::model::CallToolResult;
    use serde_json::Value;

    use crate::IneMcp;

    /// Upstream answering from a fixed path table; anything else is a 404.
    #[derive(Default)]
    pub struct FixedUpstream {
        routes: HashMap<String, UpstreamResponse>,
    }

    impl FixedUpstream {
        pub fn with_json(mut self, path: &str, body: &Value) -> Self {
            self.routes
                .insert(path.to_string(), UpstreamResponse::ok(body.to_string()));
            self
        }

        pub fn with_status(mut self, path: &str, status: u16) -> Self {
            self.routes
                .insert(path.to_string(), UpstreamResponse::status(status));
            self
        }
    }

    impl Upstream for FixedUpstream {
        async fn fetch(&self, request: &UpstreamRequest) -> IneResult<UpstreamResponse> {
            Ok(self
                .routes
                .get(&request.path())
                .cloned()
                .unwrap_or_else(|| UpstreamResponse::status(404)))
        }
    }

    pub fn server(upstream: FixedUpstream) -> IneMcp<FixedUpstream> {
        IneMcp::new(IneControlPlane::new(upstream))
    }

    /// Decodes the JSON text block of a successful tool result.
    pub fn json_body(result: &CallToolResult) -> Value {
        assert_ne!(result.is_error, Some(true));
        let text = result
            .content
            .first()
            .and_then(|content| content.as_text())
            .map(|content| content.text.as_str())
            .expect("tool result carries a text block");
        serde_json::from_str(text).expect("tool result text is JSON")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::testing::{FixedUpstream, server};
    use crate::tools::context::HelpCommands;

    #[test]
    fn routes_every_tool() {
        let mcp = server(FixedUpstream::default());
        let routed: BTreeSet<String> = mcp
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        for name in [
            "health",
            "help",
            "periodicity_help",
            "list_operations",
            "get_operation_tables",
            "get_table_variables",
            "get_variable_values",
            "get_table_data",
            "get_series_data",
            "search_data",
            "get_latest_data",
        ] {
            assert!(routed.contains(name), "{name} should be routed");
        }

        let documented: BTreeSet<String> = HelpCommands::default()
            .commands
            .iter()
            .filter_map(|line| line.split(" - ").next())
            .map(str::to_string)
            .collect();
        assert_eq!(documented, routed);
    }

    #[test]
    fn advertises_tools_capability() {
        let info = server(FixedUpstream::default()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some_and(|text| text.contains("get_series_data")));
    }
}
