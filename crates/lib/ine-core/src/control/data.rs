use ine_models::schema::{FN_SERIES_DATA, FN_TABLE_DATA};
use ine_models::{Series, SeriesLookup};

use super::IneControlPlane;
use crate::error::IneResult;
use crate::params::DataQuery;
use crate::upstream::{Upstream, UpstreamRequest};

impl<U: Upstream> IneControlPlane<U> {
    /// Fetches every series of a table with its observations.
    ///
    /// `last_periods` and `period_type` are sent upstream and enforced locally,
    /// so each `Data` sequence holds at most `last_periods` entries.
    ///
    /// # Errors
    /// Returns `IneError` on transport or decode failures.
    pub async fn get_table_data(&self, table_id: u64, query: &DataQuery) -> IneResult<Vec<Series>> {
        let request = UpstreamRequest::new(FN_TABLE_DATA)
            .with_input(table_id.to_string())
            .with_query(query.query_params());
        let mut series: Vec<Series> = self.fetch_list(request).await?;
        query.shape(&mut series);
        Ok(series)
    }

    /// Fetches one series by code.
    ///
    /// An unresolvable code, or a series whose periodicity contradicts
    /// `period_type`, is reported inline as [`SeriesLookup::Missing`].
    ///
    /// # Errors
    /// Returns `IneError` on transport or decode failures.
    pub async fn get_series_data(
        &self,
        series_code: &str,
        query: &DataQuery,
    ) -> IneResult<SeriesLookup> {
        let code = series_code.trim();
        if code.is_empty() {
            return Ok(SeriesLookup::Missing {
                error: "series_code is required".to_string(),
            });
        }

        let request = UpstreamRequest::new(FN_SERIES_DATA)
            .with_input(code)
            .with_query(query.query_params());
        let Some(mut series) = self.fetch_one::<Series>(request).await? else {
            return Ok(SeriesLookup::missing(code));
        };

        if !query.accepts_periodicity(series.periodicity) {
            let requested = query
                .period_type
                .map_or_else(String::new, |period| period.to_string());
            return Ok(SeriesLookup::Missing {
                error: format!("series {code} is not published with {requested} periodicity"),
            });
        }
        if let Some(count) = query.last_periods {
            series.truncate_to_latest(count);
        }
        Ok(SeriesLookup::Found(Box::new(series)))
    }
}
