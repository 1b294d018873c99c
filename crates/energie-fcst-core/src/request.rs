//! End-to-end request handling: region lookup, truncation and forecast.

use chrono::NaiveDate;
use tracing::debug;

use crate::engine::ForecastEngine;
use crate::error::Result;
use crate::repository::SeriesRepository;
use crate::result::ForecastResult;
use crate::series::{Observation, ObservedSeries};
use crate::window::ForecastWindow;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub region: String,
    /// Last month of history the model may see
    pub cutoff: NaiveDate,
    /// Months to forecast
    pub horizon: i64,
}

impl ForecastRequest {
    pub fn new(region: impl Into<String>, cutoff: NaiveDate, horizon: i64) -> Self {
        Self {
            region: region.into(),
            cutoff,
            horizon,
        }
    }
}

/// Everything needed to present a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    pub region: String,
    /// History up to and including the cutoff
    pub history: ObservedSeries,
    pub forecast: ForecastResult,
}

impl ForecastResponse {
    /// Last `months` observations of the history, for display next to the forecast.
    pub fn recent_history(&self, months: usize) -> &[Observation] {
        self.history.tail(months)
    }
}

/// Run one request against `repo`.
///
/// Pure with respect to its inputs: the repository is only read and the
/// same request always produces the same response.
pub fn run_request(
    repo: &SeriesRepository,
    engine: &ForecastEngine,
    request: &ForecastRequest,
) -> Result<ForecastResponse> {
    debug!(
        region = %request.region,
        cutoff = %request.cutoff,
        horizon = request.horizon,
        "Running forecast request"
    );
    let series = repo.series_for(&request.region)?;
    let history = ForecastWindow::new(request.cutoff, request.horizon).apply(series)?;
    let forecast = engine.forecast(&history, request.horizon)?;

    Ok(ForecastResponse {
        region: request.region.clone(),
        history,
        forecast,
    })
}
