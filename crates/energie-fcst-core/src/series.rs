//! Monthly observed series for a single region.

use crate::calendar::{add_months, is_month_end};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// A single monthly observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Month-end date
    pub date: NaiveDate,
    /// Total consumption for the month
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered, gap-free monthly series for one region.
///
/// Dates are month-ends, strictly increasing, exactly one month apart.
/// Values are finite. Both are checked on construction, so every
/// `ObservedSeries` in the process satisfies them.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedSeries {
    region: String,
    observations: Vec<Observation>,
}

impl ObservedSeries {
    /// Build a series, validating the monthly invariants.
    pub fn new(region: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        let region = region.into();

        for (i, obs) in observations.iter().enumerate() {
            if !is_month_end(obs.date) {
                return Err(ForecastError::InvalidInput(format!(
                    "{}: observation {} dated {} is not a month-end",
                    region, i, obs.date
                )));
            }
            if !obs.value.is_finite() {
                return Err(ForecastError::InvalidInput(format!(
                    "{}: observation {} at {} has non-finite value {}",
                    region, i, obs.date, obs.value
                )));
            }
        }

        for pair in observations.windows(2) {
            let expected = add_months(pair[0].date, 1);
            if expected != Some(pair[1].date) {
                return Err(ForecastError::InvalidInput(format!(
                    "{}: {} does not directly follow {}",
                    region, pair[1].date, pair[0].date
                )));
            }
        }

        Ok(Self {
            region,
            observations,
        })
    }

    /// Build a contiguous series starting at the month of `start`.
    pub fn from_values(region: impl Into<String>, start: NaiveDate, values: &[f64]) -> Result<Self> {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                u32::try_from(i)
                    .ok()
                    .and_then(|k| add_months(start, k))
                    .map(|date| Observation::new(date, value))
                    .ok_or_else(|| {
                        ForecastError::InvalidInput(format!(
                            "observation {} after {} is out of the supported date range",
                            i, start
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(region, observations)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// The most recent `n` observations (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    /// Copy of the prefix with dates at or before `cutoff`.
    ///
    /// The prefix of a valid series is itself valid, so no re-validation
    /// is needed.
    pub(crate) fn truncated(&self, cutoff: NaiveDate) -> Self {
        let end = self.observations.partition_point(|o| o.date <= cutoff);
        Self {
            region: self.region.clone(),
            observations: self.observations[..end].to_vec(),
        }
    }
}
