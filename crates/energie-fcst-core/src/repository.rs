//! Read-only index of regional series.

use std::collections::HashMap;

use crate::calendar::{add_months, month_end};
use crate::error::{ForecastError, LoadError, Result};
use crate::series::{ObservedSeries, Observation};
use chrono::NaiveDate;

/// One row of the tabular source: a region's consumption for a month.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub region: String,
    /// Any date inside the month; normalized to the month-end on load
    pub month: NaiveDate,
    pub value: f64,
}

impl Record {
    pub fn new(region: impl Into<String>, month: NaiveDate, value: f64) -> Self {
        Self {
            region: region.into(),
            month,
            value,
        }
    }
}

/// Immutable repository of per-region monthly series.
///
/// Built once and then shared read-only (wrap it in an `Arc` to hand it to
/// several workers). Regions are listed in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct SeriesRepository {
    regions: Vec<String>,
    series: HashMap<String, ObservedSeries>,
}

impl SeriesRepository {
    /// Build the repository from already validated series.
    pub fn from_series(
        series: impl IntoIterator<Item = ObservedSeries>,
    ) -> std::result::Result<Self, LoadError> {
        let mut repo = Self::default();
        for s in series {
            let region = s.region().to_string();
            if repo.series.contains_key(&region) {
                return Err(LoadError::DuplicateRegion(region));
            }
            repo.regions.push(region.clone());
            repo.series.insert(region, s);
        }
        Ok(repo)
    }

    /// Build the repository from raw rows.
    ///
    /// Rows may arrive in any order. Each region must end up with exactly one
    /// row per month and no missing months between its first and last month.
    pub fn from_records(
        records: impl IntoIterator<Item = Record>,
    ) -> std::result::Result<Self, LoadError> {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<Observation>> = HashMap::new();

        for record in records {
            let obs = Observation::new(month_end(record.month), record.value);
            match grouped.get_mut(&record.region) {
                Some(rows) => rows.push(obs),
                None => {
                    order.push(record.region.clone());
                    grouped.insert(record.region, vec![obs]);
                }
            }
        }

        if order.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut series = Vec::with_capacity(order.len());
        for region in order {
            let mut rows = grouped.remove(&region).unwrap_or_default();
            rows.sort_by_key(|o| o.date);

            for pair in rows.windows(2) {
                if pair[0].date == pair[1].date {
                    return Err(LoadError::DuplicateMonth {
                        region,
                        month: pair[0].date,
                    });
                }
                if add_months(pair[0].date, 1) != Some(pair[1].date) {
                    return Err(LoadError::Gap {
                        region,
                        before: pair[0].date,
                        after: pair[1].date,
                    });
                }
            }

            series.push(ObservedSeries::new(region, rows)?);
        }

        Self::from_series(series)
    }

    /// Look up a region's series.
    pub fn series_for(&self, region: &str) -> Result<&ObservedSeries> {
        self.series
            .get(region)
            .ok_or_else(|| ForecastError::NotFound(region.to_string()))
    }

    /// Region identifiers in first-appearance order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn contains(&self, region: &str) -> bool {
        self.series.contains_key(region)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
