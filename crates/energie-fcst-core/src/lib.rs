//! Core library for forecasting monthly regional energy consumption.
//!
//! A [`SeriesRepository`] holds one monthly series per region. A request
//! names a region, a cutoff month and a horizon; the history is truncated
//! at the cutoff and a seasonal ARIMA model produces dated forecasts with
//! confidence bounds.

pub mod calendar;
pub mod engine;
pub mod error;
pub mod loader;
pub mod repository;
pub mod request;
pub mod result;
pub mod sarima;
pub mod series;
pub mod window;
pub mod worker;

// Re-exports for convenience
pub use calendar::{month_end, month_ends_after, parse_month_label};
pub use engine::{EngineOptions, ForecastEngine};
pub use error::{ForecastError, LoadError, Result};
pub use loader::{load_csv, read_csv, CsvSchema};
pub use repository::{Record, SeriesRepository};
pub use request::{run_request, ForecastRequest, ForecastResponse};
pub use result::{FitDiagnostics, ForecastResult, ForecastRow};
pub use sarima::{fit_sarima, FitOptions, SarimaFit, SarimaSpec};
pub use series::{Observation, ObservedSeries};
pub use window::{available_cutoffs, select, ForecastWindow, MIN_HISTORY};
pub use worker::{spawn_forecast, ForecastHandle};
