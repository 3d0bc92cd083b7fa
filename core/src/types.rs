//! Shared primitive types and month helpers used across the pipeline.

use crate::error::{PipelineError, PipelineResult};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// A reporting month, identified by its last calendar day.
pub type Month = NaiveDate;

/// The master seed for a run.
pub type Seed = u64;

/// Storage form of a month: a midnight timestamp, `YYYY-MM-DD 00:00:00`.
pub const MONTH_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display and CSV form of a month.
pub const MONTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// `count` consecutive month-end dates, the first being the last day of
/// `start_year`-`start_month`. Returns `None` for an invalid start month.
pub fn month_ends(start_year: i32, start_month: u32, count: usize) -> Option<Vec<Month>> {
    let first_of_start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;
    (0..count)
        .map(|i| {
            let next_first = first_of_start.checked_add_months(Months::new(i as u32 + 1))?;
            next_first.pred_opt()
        })
        .collect()
}

pub fn format_month_timestamp(month: Month) -> String {
    month.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .format(MONTH_TIMESTAMP_FORMAT)
        .to_string()
}

/// Parse a stored month back into a date.
/// Accepts the timestamp form written by the warehouse and a bare date.
pub fn parse_month(raw: &str) -> PipelineResult<Month> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, MONTH_TIMESTAMP_FORMAT)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(trimmed, MONTH_DATE_FORMAT))
        .map_err(|_| PipelineError::MonthParse(raw.to_string()))
}

/// Short axis label, e.g. `2022-01`.
pub fn month_label(month: Month) -> String {
    format!("{:04}-{:02}", month.year(), month.month())
}
