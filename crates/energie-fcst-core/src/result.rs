//! Forecast output types.

use chrono::NaiveDate;

use crate::sarima::SarimaCoefficients;

/// In-sample diagnostics of the fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    pub coefficients: SarimaCoefficients,
    /// Innovation variance
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Nelder-Mead iterations used
    pub iterations: u64,
    /// Observations left after differencing
    pub nobs: usize,
}

/// Forecast for consecutive months following a cutoff.
///
/// All vectors have the same length, one entry per forecast month, and
/// `lower[i] <= point[i] <= upper[i]` holds for every entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Month-end dates of the forecast months
    pub dates: Vec<NaiveDate>,
    /// Point forecasts
    pub point: Vec<f64>,
    /// Lower confidence bounds
    pub lower: Vec<f64>,
    /// Upper confidence bounds
    pub upper: Vec<f64>,
    /// Coverage of the interval, e.g. 0.95
    pub confidence_level: f64,
    /// Model name used
    pub model_name: String,
    pub diagnostics: FitDiagnostics,
}

/// One forecast month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Row view in date order.
    pub fn iter(&self) -> impl Iterator<Item = ForecastRow> + '_ {
        (0..self.len()).map(move |i| ForecastRow {
            date: self.dates[i],
            point: self.point[i],
            lower: self.lower[i],
            upper: self.upper[i],
        })
    }

    /// Width of the interval for month `i`.
    pub fn interval_width(&self, i: usize) -> Option<f64> {
        Some(self.upper.get(i)? - self.lower.get(i)?)
    }
}
