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

/// Parameters for listing the operation catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListOperationsParams {
    /// Case- and accent-insensitive text matched against `Codigo` and `Nombre`.
    pub filter_text: Option<String>,
}

/// Parameters for listing the tables of an operation.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetOperationTablesParams {
    /// Operation `Codigo`, e.g. `IPC`.
    pub operation_code: String,
}

/// Parameters for listing the variables of a table.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetTableVariablesParams {
    pub table_id: u64,
}

/// Parameters for listing the values of a table variable.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetVariableValuesParams {
    pub variable_id: u64,
    pub table_id: u64,
}

#[tool_router(router = tool_router_catalog, vis = "pub")]
impl<U: Upstream> IneMcp<U> {
    #[tool(description = "List INE statistical operations, optionally filtered by code or name.")]
    async fn list_operations(
        &self,
        Parameters(params): Parameters<ListOperationsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let operations = self
            .control()
            .list_operations(params.filter_text.as_deref())
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(operations)?]))
    }

    #[tool(description = "List the tables published under an operation code.")]
    async fn get_operation_tables(
        &self,
        Parameters(params): Parameters<GetOperationTablesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let tables = self
            .control()
            .get_operation_tables(&params.operation_code)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(tables)?]))
    }

    #[tool(description = "List the selection variables of a table.")]
    async fn get_table_variables(
        &self,
        Parameters(params): Parameters<GetTableVariablesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let variables = self
            .control()
            .get_table_variables(params.table_id)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(variables)?]))
    }

    #[tool(description = "List the values a variable takes within a table.")]
    async fn get_variable_values(
        &self,
        Parameters(params): Parameters<GetVariableValuesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let values = self
            .control()
            .get_variable_values(params.variable_id, params.table_id)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(values)?]))
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;
    use serde_json::json;

    use super::*;
    use crate::testing::{FixedUpstream, json_body, server};

    #[tokio::test]
    async fn unknown_operation_is_an_empty_success() {
        let mcp = server(FixedUpstream::default());
        let result = mcp
            .get_operation_tables(Parameters(GetOperationTablesParams {
                operation_code: "OPERACION_INEXISTENTE_XYZ".to_string(),
            }))
            .await
            .expect("unknown codes are not errors");
        assert_eq!(json_body(&result), json!([]));
    }

    #[tokio::test]
    async fn upstream_outage_is_a_tool_error() {
        let mcp = server(FixedUpstream::default().with_status("OPERACIONES_DISPONIBLES", 502));
        let err = mcp
            .list_operations(Parameters(ListOperationsParams::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn filtered_catalog_succeeds() {
        let mcp = server(FixedUpstream::default().with_json(
            "OPERACIONES_DISPONIBLES",
            &json!([
                {"Id": 25, "Codigo": "IPC", "Nombre": "Índice de Precios de Consumo (IPC)"},
                {"Id": 293, "Codigo": "EPA", "Nombre": "Encuesta de Población Activa (EPA)"}
            ]),
        ));
        let result = mcp
            .list_operations(Parameters(ListOperationsParams {
                filter_text: Some("indice".to_string()),
            }))
            .await
            .expect("catalog should load");
        let body = json_body(&result);
        let operations = body.as_array().expect("operations list");
        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0]["Codigo"], "IPC");
        assert_eq!(operations[0]["Id"], 25);
    }
}
