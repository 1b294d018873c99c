//! History truncation and the minimum-history rule.

use crate::calendar::month_end;
use crate::error::{ForecastError, Result};
use crate::series::ObservedSeries;
use chrono::NaiveDate;

/// Minimum number of observations up to and including the cutoff.
///
/// Two full seasonal cycles of monthly data: one is consumed by seasonal
/// differencing, the second leaves room for the seasonal terms.
pub const MIN_HISTORY: usize = 24;

/// Truncate `series` to the observations dated at or before `cutoff`.
///
/// The cutoff is first moved to the end of its month. Returns an owned copy
/// so that concurrent requests never share mutable state.
///
/// Fails with [`ForecastError::InsufficientHistory`] when fewer than
/// [`MIN_HISTORY`] observations remain, and with
/// [`ForecastError::InvalidInput`] when the cutoff lies past the last
/// observation. A cutoff is accepted exactly when it is one of
/// [`available_cutoffs`].
pub fn select(series: &ObservedSeries, cutoff: NaiveDate) -> Result<ObservedSeries> {
    let cutoff = month_end(cutoff);
    let truncated = series.truncated(cutoff);
    if truncated.len() < MIN_HISTORY {
        return Err(ForecastError::InsufficientHistory {
            needed: MIN_HISTORY,
            got: truncated.len(),
        });
    }
    if let Some(last) = series.last_date().filter(|last| cutoff > *last) {
        return Err(ForecastError::InvalidInput(format!(
            "cutoff {} is after the last observation {} of {}",
            cutoff,
            last,
            series.region()
        )));
    }
    Ok(truncated)
}

/// Cutoff dates that can be offered for `series`.
///
/// Every date with at least [`MIN_HISTORY`] observations up to and
/// including itself, in chronological order.
pub fn available_cutoffs(series: &ObservedSeries) -> Vec<NaiveDate> {
    series
        .observations()
        .iter()
        .skip(MIN_HISTORY - 1)
        .map(|o| o.date)
        .collect()
}

/// A cutoff date plus a forecast horizon in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    pub cutoff: NaiveDate,
    pub horizon: i64,
}

impl ForecastWindow {
    pub fn new(cutoff: NaiveDate, horizon: i64) -> Self {
        Self { cutoff, horizon }
    }

    /// Validate the horizon and truncate `series` at the cutoff.
    pub fn apply(&self, series: &ObservedSeries) -> Result<ObservedSeries> {
        if self.horizon <= 0 {
            return Err(ForecastError::InvalidHorizon(self.horizon));
        }
        select(series, self.cutoff)
    }
}
