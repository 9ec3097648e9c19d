//! Validation of tool parameters into upstream query parameters.
//!
//! Invalid values are rejected before any upstream call.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use ine_models::schema::{
    MAX_DETAIL_LEVEL,
    PARAM_DATE,
    PARAM_DETAIL,
    PARAM_LAST_PERIODS,
    PARAM_PERIODICITY,
};
use ine_models::{PeriodType, Series};

use crate::error::{IneError, IneResult};

const DATE_FORMAT: &str = "%Y%m%d";

/// Inclusive `YYYYMMDD:YYYYMMDD` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FromStr for DateRange {
    type Err = IneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (start, end) = value
            .trim()
            .split_once(':')
            .ok_or_else(|| IneError::invalid("date_range", "expected YYYYMMDD:YYYYMMDD"))?;
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(IneError::invalid(
                "date_range",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(value: &str) -> IneResult<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 {
        return Err(IneError::invalid(
            "date_range",
            format!("'{value}' is not a YYYYMMDD date"),
        ));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| {
        IneError::invalid("date_range", format!("'{value}' is not a valid date: {err}"))
    })
}

/// Options shared by the table and series data tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataQuery {
    pub last_periods: Option<usize>,
    pub period_type: Option<PeriodType>,
    pub date_range: Option<DateRange>,
    pub detail_level: Option<u8>,
}

impl DataQuery {
    /// Query returning only the most recent observation of each series.
    #[must_use]
    pub const fn latest() -> Self {
        Self {
            last_periods: Some(1),
            period_type: None,
            date_range: None,
            detail_level: None,
        }
    }

    /// Validates raw tool arguments. Blank strings count as absent.
    ///
    /// # Errors
    /// Returns `IneError::InvalidParams` naming the first offending argument.
    pub fn from_raw(
        last_periods: Option<i64>,
        period_type: Option<&str>,
        date_range: Option<&str>,
        detail_level: Option<i64>,
    ) -> IneResult<Self> {
        let last_periods = last_periods
            .map(|value| {
                usize::try_from(value)
                    .ok()
                    .filter(|count| *count > 0)
                    .ok_or_else(|| {
                        IneError::invalid(
                            "last_periods",
                            format!("must be a positive integer, got {value}"),
                        )
                    })
            })
            .transpose()?;

        let period_type = non_blank(period_type)
            .map(|value| {
                value
                    .parse::<PeriodType>()
                    .map_err(|err| IneError::invalid("period_type", err.to_string()))
            })
            .transpose()?;

        let date_range = non_blank(date_range).map(str::parse::<DateRange>).transpose()?;

        let detail_level = detail_level
            .map(|value| {
                u8::try_from(value)
                    .ok()
                    .filter(|level| *level <= MAX_DETAIL_LEVEL)
                    .ok_or_else(|| {
                        IneError::invalid(
                            "detail_level",
                            format!("must be between 0 and {MAX_DETAIL_LEVEL}, got {value}"),
                        )
                    })
            })
            .transpose()?;

        Ok(Self {
            last_periods,
            period_type,
            date_range,
            detail_level,
        })
    }

    /// Upstream query parameters for this query.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(count) = self.last_periods {
            params.push((PARAM_LAST_PERIODS, count.to_string()));
        }
        if let Some(level) = self.detail_level {
            params.push((PARAM_DETAIL, level.to_string()));
        }
        if let Some(range) = self.date_range {
            params.push((PARAM_DATE, range.to_string()));
        }
        if let Some(period) = self.period_type {
            params.push((PARAM_PERIODICITY, period.code().to_string()));
        }
        params
    }

    /// Whether a series with the given periodicity satisfies `period_type`.
    /// Series that do not report a periodicity are kept.
    #[must_use]
    pub fn accepts_periodicity(&self, periodicity: Option<u32>) -> bool {
        match (self.period_type, periodicity) {
            (Some(period), Some(code)) => period.code() == code,
            _ => true,
        }
    }

    /// Applies the local part of the query: periodicity filter and
    /// `last_periods` truncation.
    pub fn shape(&self, series: &mut Vec<Series>) {
        series.retain(|item| self.accepts_periodicity(item.periodicity));
        if let Some(count) = self.last_periods {
            for item in series.iter_mut() {
                item.truncate_to_latest(count);
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
