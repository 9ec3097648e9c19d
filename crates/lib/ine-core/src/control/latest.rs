use futures::{StreamExt, stream};
use ine_models::{LatestRecord, Table};

use super::IneControlPlane;
use crate::error::IneResult;
use crate::params::DataQuery;
use crate::upstream::Upstream;

impl<U: Upstream> IneControlPlane<U> {
    /// Summarises the most recent observation of every series in the selected
    /// tables of an operation.
    ///
    /// With `table_filter`, the tables whose `Id` or `Codigo` equal it are
    /// selected; otherwise the first `latest_table_limit` tables in catalog
    /// order. Unknown operations and empty selections yield an empty list.
    ///
    /// # Errors
    /// Returns `IneError` if the table list cannot be fetched. Failed table
    /// data lookups are logged and skipped.
    pub async fn get_latest_data(
        &self,
        operation_code: &str,
        table_filter: Option<&str>,
    ) -> IneResult<Vec<LatestRecord>> {
        let tables = self.get_operation_tables(operation_code).await?;
        let selected: Vec<Table> = match table_filter.map(str::trim).filter(|value| !value.is_empty())
        {
            Some(filter) => tables
                .into_iter()
                .filter(|table| table_matches(table, filter))
                .collect(),
            None => tables
                .into_iter()
                .take(self.options.latest_table_limit)
                .collect(),
        };

        let plane = self.clone();
        let per_table: Vec<Vec<LatestRecord>> = stream::iter(selected)
            .map(move |table: Table| {
                let plane = plane.clone();
                async move {
                    match plane.get_table_data(table.id, &DataQuery::latest()).await {
                        Ok(series) => series
                            .iter()
                            .filter_map(|item| LatestRecord::from_series(&table, item))
                            .collect(),
                        Err(err) => {
                            tracing::warn!(table_id = table.id, error = %err, "skipping table");
                            Vec::new()
                        }
                    }
                }
            })
            .buffered(self.options.max_concurrency)
            .collect()
            .await;

        Ok(per_table.into_iter().flatten().collect())
    }
}

fn table_matches(table: &Table, filter: &str) -> bool {
    table.id.to_string() == filter
        || (!table.code.is_empty() && table.code.eq_ignore_ascii_case(filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn table(id: u64, code: &str) -> Table {
        Table {
            id,
            name: format!("Tabla {id}"),
            code: code.to_string(),
            periodicity: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn matches_by_id_or_code() {
        assert!(table_matches(&table(50902, ""), "50902"));
        assert!(table_matches(&table(1, "ipc_general"), "IPC_GENERAL"));
        assert!(!table_matches(&table(1, ""), ""));
        assert!(!table_matches(&table(50902, "X"), "5090"));
    }
}
