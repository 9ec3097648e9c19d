use ine_core::Upstream;
use ine_models::PeriodType;
use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::IneMcp;

/// Payload listing the MCP commands of this server.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: [
                "health - Returns ok.",
                "help - List the MCP commands of this server.",
                "periodicity_help - Accepted period_type spellings and their upstream codes.",
                "list_operations - List statistical operations, optionally filtered by filter_text.",
                "get_operation_tables - List the tables of an operation code.",
                "get_table_variables - List the selection variables of a table.",
                "get_variable_values - List the values of a variable within a table.",
                "get_table_data - Fetch the series of a table (last_periods, period_type, date_range, detail_level).",
                "get_series_data - Fetch one series by COD, or {\"error\": ...} if it does not exist.",
                "search_data - Search operations and tables by text (operation_filter, max_results).",
                "get_latest_data - Latest observation per series for an operation (table_filter).",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

/// One accepted periodicity.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PeriodicityEntry {
    pub period_type: String,
    pub code: u32,
    pub aliases: Vec<String>,
}

fn periodicities() -> Vec<PeriodicityEntry> {
    PeriodType::ALL
        .iter()
        .map(|period| PeriodicityEntry {
            period_type: period.as_str().to_string(),
            code: period.code(),
            aliases: period.aliases().iter().map(|alias| (*alias).to_string()).collect(),
        })
        .collect()
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl<U: Upstream> IneMcp<U> {
    #[tool(description = "List the MCP commands of this server.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }

    #[tool(description = "Accepted period_type values and the upstream FK_Periodicidad codes they map to.")]
    async fn periodicity_help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(periodicities())?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_parses_back() {
        for entry in periodicities() {
            for alias in entry.aliases.iter().chain(std::iter::once(&entry.period_type)) {
                let parsed: PeriodType = alias.parse().expect("alias should parse");
                assert_eq!(parsed.code(), entry.code);
            }
        }
    }
}
