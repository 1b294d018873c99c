//! Seasonal ARIMA estimation.

pub mod diff;
mod model;
mod spec;
mod statespace;

pub use model::{fit_sarima, FitOptions, SarimaCoefficients, SarimaFit, SarimaForecast};
pub use spec::SarimaSpec;
pub use statespace::{ArmaStateSpace, FilterOutput};
