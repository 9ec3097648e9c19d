use ine_core::{DataQuery, Upstream};
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

/// Parameters for fetching the series of a table.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetTableDataParams {
    pub table_id: u64,
    /// Keep only the N most recent observations of each series.
    pub last_periods: Option<i64>,
    /// `monthly`, `quarterly`, `semiannual` or `annual` (or M/Q/S/A).
    pub period_type: Option<String>,
    /// `YYYYMMDD:YYYYMMDD`.
    pub date_range: Option<String>,
    /// Upstream detail level, 0 to 2.
    pub detail_level: Option<i64>,
}

/// Parameters for fetching one series.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetSeriesDataParams {
    /// Series `COD`, e.g. `IPC251856`.
    pub series_code: String,
    pub last_periods: Option<i64>,
    pub period_type: Option<String>,
}

#[tool_router(router = tool_router_data, vis = "pub")]
impl<U: Upstream> IneMcp<U> {
    #[tool(description = "Fetch every series of a table with its observations.")]
    async fn get_table_data(
        &self,
        Parameters(params): Parameters<GetTableDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = DataQuery::from_raw(
            params.last_periods,
            params.period_type.as_deref(),
            params.date_range.as_deref(),
            params.detail_level,
        )
        .map_err(helpers::map_err)?;
        let series = self
            .control()
            .get_table_data(params.table_id, &query)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(series)?]))
    }

    #[tool(description = "Fetch one series by code. Unknown codes return {\"error\": ...}.")]
    async fn get_series_data(
        &self,
        Parameters(params): Parameters<GetSeriesDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = DataQuery::from_raw(
            params.last_periods,
            params.period_type.as_deref(),
            None,
            None,
        )
        .map_err(helpers::map_err)?;
        let lookup = self
            .control()
            .get_series_data(&params.series_code, &query)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(lookup)?]))
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;
    use serde_json::json;

    use super::*;
    use crate::testing::{FixedUpstream, json_body, server};

    fn table_params(table_id: u64) -> GetTableDataParams {
        GetTableDataParams {
            table_id,
            last_periods: None,
            period_type: None,
            date_range: None,
            detail_level: None,
        }
    }

    #[tokio::test]
    async fn rejects_bad_arguments_before_fetching() {
        let mcp = server(FixedUpstream::default().with_status("DATOS_TABLA/50902", 500));
        for params in [
            GetTableDataParams {
                last_periods: Some(0),
                ..table_params(50902)
            },
            GetTableDataParams {
                period_type: Some("weekly".to_string()),
                ..table_params(50902)
            },
            GetTableDataParams {
                date_range: Some("20241231:20240101".to_string()),
                ..table_params(50902)
            },
            GetTableDataParams {
                detail_level: Some(9),
                ..table_params(50902)
            },
        ] {
            let err = mcp.get_table_data(Parameters(params)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        }
    }

    #[tokio::test]
    async fn missing_series_is_reported_inline() {
        let mcp = server(FixedUpstream::default());
        let result = mcp
            .get_series_data(Parameters(GetSeriesDataParams {
                series_code: "SERIE_INEXISTENTE_XYZ".to_string(),
                last_periods: Some(1),
                period_type: None,
            }))
            .await
            .expect("missing series is not a tool error");
        let body = json_body(&result);
        assert!(body["error"].as_str().is_some_and(|text| text.contains("SERIE_INEXISTENTE_XYZ")));
        assert!(body.get("Data").is_none());
        assert!(body.get("COD").is_none());
    }

    #[tokio::test]
    async fn table_data_succeeds() {
        let mcp = server(FixedUpstream::default().with_json(
            "DATOS_TABLA/25171",
            &json!([{"COD": "IPV769", "Nombre": "País Vasco. General. Índice.",
                     "Data": [{"Fecha": 1_711_922_400_000_i64, "Valor": 152.1},
                              {"Fecha": 1_719_784_800_000_i64, "Valor": 155.4}]}]),
        ));
        let result = mcp
            .get_table_data(Parameters(GetTableDataParams {
                last_periods: Some(1),
                ..table_params(25171)
            }))
            .await
            .expect("table data should load");
        let body = json_body(&result);
        let series = body.as_array().expect("series list");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["COD"], "IPV769");
        let data = series[0]["Data"].as_array().expect("observations");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["Valor"], 155.4);
    }
}
