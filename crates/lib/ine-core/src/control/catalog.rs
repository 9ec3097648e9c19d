use ine_models::schema::{
    FN_OPERATIONS,
    FN_OPERATION_TABLES,
    FN_TABLE_GROUPS,
    FN_TABLE_GROUP_VALUES,
};
use ine_models::{Operation, Table, Variable, VariableValue};

use super::IneControlPlane;
use crate::error::IneResult;
use crate::text::TextMatcher;
use crate::upstream::{Upstream, UpstreamRequest};

impl<U: Upstream> IneControlPlane<U> {
    /// Lists the operation catalog, optionally filtered by a case- and
    /// accent-insensitive substring of `Codigo` or `Nombre`.
    ///
    /// The filter is applied locally after fetching the full catalog.
    ///
    /// # Errors
    /// Returns `IneError` if the catalog cannot be fetched or decoded.
    pub async fn list_operations(&self, filter: Option<&str>) -> IneResult<Vec<Operation>> {
        let operations: Vec<Operation> =
            self.fetch_list(UpstreamRequest::new(FN_OPERATIONS)).await?;
        let Some(matcher) = filter.and_then(TextMatcher::new) else {
            return Ok(operations);
        };
        Ok(operations
            .into_iter()
            .filter(|operation| {
                matcher
                    .match_fields(&operation.code, &operation.name)
                    .is_some()
            })
            .collect())
    }

    /// Lists the tables of an operation. Unknown or blank codes yield an
    /// empty list.
    ///
    /// # Errors
    /// Returns `IneError` on transport or decode failures.
    pub async fn get_operation_tables(&self, operation_code: &str) -> IneResult<Vec<Table>> {
        let code = operation_code.trim();
        if code.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_list(UpstreamRequest::new(FN_OPERATION_TABLES).with_input(code))
            .await
    }

    /// Lists the selection variables of a table.
    ///
    /// # Errors
    /// Returns `IneError` on transport or decode failures.
    pub async fn get_table_variables(&self, table_id: u64) -> IneResult<Vec<Variable>> {
        self.fetch_list(UpstreamRequest::new(FN_TABLE_GROUPS).with_input(table_id.to_string()))
            .await
    }

    /// Lists the values one variable takes within a table.
    ///
    /// # Errors
    /// Returns `IneError` on transport or decode failures.
    pub async fn get_variable_values(
        &self,
        variable_id: u64,
        table_id: u64,
    ) -> IneResult<Vec<VariableValue>> {
        let request = UpstreamRequest::new(FN_TABLE_GROUP_VALUES)
            .with_input(table_id.to_string())
            .with_input(variable_id.to_string());
        self.fetch_list(request).await
    }
}
