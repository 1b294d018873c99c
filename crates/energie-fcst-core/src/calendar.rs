//! Month-end date arithmetic.
//!
//! Monthly observations are stamped with the last calendar day of their
//! month. All helpers here keep that normalization.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Get the last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .unwrap_or(date)
}

/// Check whether `date` is the last day of its month.
pub fn is_month_end(date: NaiveDate) -> bool {
    month_end(date) == date
}

/// Month-end `months` months after the month containing `date`.
///
/// Returns `None` if the result falls outside chrono's supported range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months)))
        .map(month_end)
}

/// The `count` consecutive month-ends strictly after the month of `cutoff`.
pub fn month_ends_after(cutoff: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (1..=count)
        .map(|k| {
            u32::try_from(k)
                .ok()
                .and_then(|k| add_months(cutoff, k))
                .ok_or_else(|| {
                    ForecastError::InvalidInput(format!(
                        "{} months after {} is out of the supported date range",
                        k, cutoff
                    ))
                })
        })
        .collect()
}

/// Parse a month label and normalize it to the month-end.
///
/// Accepts `YYYY-MM`, `YYYY-MM-DD`, `YYYY/MM` and `YYYY/MM/DD`. A full date
/// is mapped to the end of its own month.
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    let parsed = NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(label, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{label}/01"), "%Y/%m/%d"))
        .ok()?;
    Some(month_end(parsed))
}
