//! Error types for the forecasting core.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types for forecast requests.
///
/// Every variant is terminal for the request that produced it: no partial
/// result accompanies an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Region not found: {0}")]
    NotFound(String),

    #[error("Insufficient history: need at least {needed} observations, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("Invalid horizon: {0} (must be a positive number of months)")]
    InvalidHorizon(i64),

    #[error("Model fit did not converge: {0}")]
    Convergence(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Forecast did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Forecast worker stopped without producing a result")]
    WorkerLost,
}

impl ForecastError {
    /// Convert to a flat status code for callers without a rich error type.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::NotFound(_) => 1,
            ForecastError::InsufficientHistory { .. } => 2,
            ForecastError::InvalidHorizon(_) => 3,
            ForecastError::Convergence(_) => 4,
            ForecastError::InvalidInput(_) => 5,
            ForecastError::InvalidParameter { .. } => 6,
            ForecastError::Timeout(_) => 7,
            ForecastError::WorkerLost => 8,
        }
    }

    /// Whether the user can fix the request by choosing another region or cutoff.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ForecastError::NotFound(_) | ForecastError::InsufficientHistory { .. }
        )
    }
}

/// Errors raised while building a [`SeriesRepository`](crate::SeriesRepository)
/// from a tabular source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{0}' in header")]
    MissingColumn(String),

    #[error("Line {line}: invalid month label '{value}'")]
    InvalidMonth { line: u64, value: String },

    #[error("Line {line}: invalid consumption value '{value}'")]
    InvalidValue { line: u64, value: String },

    #[error("Region '{region}' has more than one row for {month}")]
    DuplicateMonth { region: String, month: NaiveDate },

    #[error("Region '{region}' has a gap between {before} and {after}")]
    Gap {
        region: String,
        before: NaiveDate,
        after: NaiveDate,
    },

    #[error("Region '{0}' appears more than once")]
    DuplicateRegion(String),

    #[error("Invalid series: {0}")]
    Series(#[from] ForecastError),

    #[error("Dataset contains no rows")]
    Empty,
}
