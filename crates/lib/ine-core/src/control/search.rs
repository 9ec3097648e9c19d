use std::pin::pin;

use futures::{StreamExt, stream};
use ine_models::schema::FN_OPERATIONS;
use ine_models::{Operation, SearchResult, Table};

use super::IneControlPlane;
use crate::error::IneResult;
use crate::text::TextMatcher;
use crate::upstream::{Upstream, UpstreamRequest};

impl<U: Upstream> IneControlPlane<U> {
    /// Searches operations and their tables for `query`.
    ///
    /// Candidate operations are the whole catalog, or those matching
    /// `operation_filter` when one is given. Results follow catalog order:
    /// each candidate operation (if it matches) followed by its matching
    /// tables. The list is cut at `max_results`, dropping later matches.
    ///
    /// # Errors
    /// Returns `IneError` if the operation catalog cannot be fetched. Failed
    /// table lookups are logged and skipped.
    pub async fn search_data(
        &self,
        query: &str,
        operation_filter: Option<&str>,
        max_results: Option<usize>,
    ) -> IneResult<Vec<SearchResult>> {
        let limit = max_results.unwrap_or(self.options.default_max_results);
        let Some(matcher) = TextMatcher::new(query) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let operations: Vec<Operation> =
            self.fetch_list(UpstreamRequest::new(FN_OPERATIONS)).await?;
        let filter = operation_filter.and_then(TextMatcher::new);
        let candidates: Vec<Operation> = operations
            .into_iter()
            .filter(|operation| {
                filter.as_ref().is_none_or(|filter| {
                    filter
                        .match_fields(&operation.code, &operation.name)
                        .is_some()
                })
            })
            .collect();

        let plane = self.clone();
        let mut expansions = pin!(
            stream::iter(candidates)
                .map(move |operation: Operation| {
                    let plane = plane.clone();
                    async move {
                        let tables = plane.tables_or_empty(&operation.code).await;
                        (operation, tables)
                    }
                })
                .buffered(self.options.max_concurrency)
        );

        let mut results = Vec::new();
        while let Some((operation, tables)) = expansions.next().await {
            if let Some(field) = matcher.match_fields(&operation.code, &operation.name) {
                results.push(SearchResult::from_operation(&operation, field));
            }
            results.extend(tables.iter().filter_map(|table| {
                matcher
                    .match_fields(&table.code, &table.name)
                    .map(|field| SearchResult::from_table(&operation.code, table, field))
            }));
            if results.len() >= limit {
                break;
            }
        }
        results.truncate(limit);
        Ok(results)
    }

    /// Tables of an operation, or an empty list if the lookup fails.
    pub(crate) async fn tables_or_empty(&self, operation_code: &str) -> Vec<Table> {
        match self.get_operation_tables(operation_code).await {
            Ok(tables) => tables,
            Err(err) => {
                tracing::warn!(operation_code, error = %err, "skipping tables of operation");
                Vec::new()
            }
        }
    }
}
