//! Forecast engine: fits the seasonal model to a truncated history and
//! produces dated forecasts with confidence bounds.

use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{info, warn};

use crate::calendar::month_ends_after;
use crate::error::{ForecastError, Result};
use crate::result::{FitDiagnostics, ForecastResult};
use crate::sarima::{fit_sarima, FitOptions, SarimaSpec};
use crate::series::ObservedSeries;
use crate::window::MIN_HISTORY;

/// Relative slack below zero tolerated in a forecast variance before it is
/// treated as a numerical failure.
const VARIANCE_SLACK: f64 = 1e-9;

/// Options for [`ForecastEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Coverage of the confidence interval
    pub confidence_level: f64,
    /// Maximum optimizer iterations
    pub max_iters: u64,
    /// Optimizer convergence tolerance on the simplex costs
    pub sd_tolerance: f64,
    /// Size of the initial simplex
    pub initial_step: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let fit = FitOptions::default();
        Self {
            confidence_level: 0.95,
            max_iters: fit.max_iters,
            sd_tolerance: fit.sd_tolerance,
            initial_step: fit.initial_step,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter {
                param: "confidence_level".into(),
                value: self.confidence_level.to_string(),
                reason: "must be in (0, 1)".into(),
            });
        }
        self.fit_options().validate()
    }

    fn fit_options(&self) -> FitOptions {
        FitOptions {
            max_iters: self.max_iters,
            sd_tolerance: self.sd_tolerance,
            initial_step: self.initial_step,
            ..FitOptions::default()
        }
    }
}

/// Fits SARIMA(1,1,1)(1,1,1)\[12\] and forecasts from the last observation.
///
/// The engine holds no per-request state; one instance can serve any
/// number of requests, concurrently or not.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    spec: SarimaSpec,
    options: EngineOptions,
    z: f64,
}

impl ForecastEngine {
    pub fn new(options: EngineOptions) -> Result<Self> {
        options.validate()?;
        let z = normal_quantile((1.0 + options.confidence_level) / 2.0)?;
        Ok(Self {
            spec: SarimaSpec::default(),
            options,
            z,
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn spec(&self) -> &SarimaSpec {
        &self.spec
    }

    /// Forecast `horizon` months past the last observation of `history`.
    ///
    /// `history` is expected to be the output of the window selector; the
    /// minimum-history rule is checked again here.
    pub fn forecast(&self, history: &ObservedSeries, horizon: i64) -> Result<ForecastResult> {
        if horizon <= 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        let steps = usize::try_from(horizon).map_err(|_| ForecastError::InvalidHorizon(horizon))?;

        if history.len() < MIN_HISTORY {
            return Err(ForecastError::InsufficientHistory {
                needed: MIN_HISTORY,
                got: history.len(),
            });
        }
        let last = history.last_date().ok_or_else(|| {
            ForecastError::InvalidInput("history has no observations".into())
        })?;
        let dates = month_ends_after(last, steps)?;

        let fit = fit_sarima(&history.values(), &self.spec, &self.options.fit_options())
            .inspect_err(|e| {
                warn!(region = history.region(), error = %e, "Model fit failed");
            })?;
        let fc = fit.forecast(steps);

        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        for (i, (&point, &variance)) in fc.point.iter().zip(fc.variance.iter()).enumerate() {
            let (lo, hi) = self.bounds(point, variance).ok_or_else(|| {
                warn!(
                    region = history.region(),
                    step = i + 1,
                    point,
                    variance,
                    "Forecast bounds are inconsistent"
                );
                ForecastError::Convergence(format!(
                    "inconsistent forecast at step {}: point {}, variance {}",
                    i + 1,
                    point,
                    variance
                ))
            })?;
            lower.push(lo);
            upper.push(hi);
        }

        info!(
            region = history.region(),
            cutoff = %last,
            horizon = steps,
            sigma2 = fit.sigma2(),
            iterations = fit.iterations(),
            "Forecast completed"
        );

        Ok(ForecastResult {
            dates,
            point: fc.point,
            lower,
            upper,
            confidence_level: self.options.confidence_level,
            model_name: self.spec.name(),
            diagnostics: FitDiagnostics {
                coefficients: fit.coefficients().clone(),
                sigma2: fit.sigma2(),
                log_likelihood: fit.log_likelihood(),
                aic: fit.aic(),
                bic: fit.bic(),
                iterations: fit.iterations(),
                nobs: fit.nobs(),
            },
        })
    }

    /// Interval around `point`, or `None` if the inputs cannot produce
    /// `lower <= point <= upper`.
    fn bounds(&self, point: f64, variance: f64) -> Option<(f64, f64)> {
        if !point.is_finite() || !variance.is_finite() {
            return None;
        }
        let slack = VARIANCE_SLACK * (1.0 + point * point);
        if variance < -slack {
            return None;
        }
        let half_width = self.z * variance.max(0.0).sqrt();
        let (lower, upper) = (point - half_width, point + half_width);
        (lower.is_finite() && upper.is_finite() && lower <= point && point <= upper)
            .then_some((lower, upper))
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            spec: SarimaSpec::default(),
            options: EngineOptions::default(),
            // Two-sided 95% standard normal quantile
            z: 1.959_963_984_540_054,
        }
    }
}

fn normal_quantile(p: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidInput(format!("standard normal: {}", e)))?;
    Ok(normal.inverse_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn history(n: usize) -> ObservedSeries {
        let values: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64;
                let noise = ((t * 12.9898).sin() * 43758.5453).fract();
                5000.0 + 3.0 * t + 600.0 * (2.0 * std::f64::consts::PI * t / 12.0).cos() + 40.0 * noise
            })
            .collect();
        let start = NaiveDate::from_ymd_opt(2015, 1, 31).unwrap();
        ObservedSeries::from_values("Occitanie", start, &values).unwrap()
    }

    #[test]
    fn test_default_z_matches_statrs() {
        let z = normal_quantile(0.975).unwrap();
        assert_relative_eq!(z, ForecastEngine::default().z, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_confidence_level() {
        for level in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let options = EngineOptions {
                confidence_level: level,
                ..EngineOptions::default()
            };
            assert!(matches!(
                ForecastEngine::new(options),
                Err(ForecastError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_horizon() {
        let engine = ForecastEngine::default();
        let h = history(30);
        assert_eq!(
            engine.forecast(&h, 0).unwrap_err(),
            ForecastError::InvalidHorizon(0)
        );
        assert_eq!(
            engine.forecast(&h, -1).unwrap_err(),
            ForecastError::InvalidHorizon(-1)
        );
    }

    #[test]
    fn test_short_history_rejected() {
        let engine = ForecastEngine::default();
        let err = engine.forecast(&history(23), 12).unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientHistory {
                needed: 24,
                got: 23
            }
        );
    }

    #[test]
    fn test_forecast_dates_and_bounds() {
        let engine = ForecastEngine::default();
        let h = history(36);
        let result = engine.forecast(&h, 12).unwrap();

        assert_eq!(result.len(), 12);
        assert_eq!(result.first_date(), NaiveDate::from_ymd_opt(2018, 1, 31));
        assert_eq!(result.last_date(), NaiveDate::from_ymd_opt(2018, 12, 31));
        assert_eq!(result.model_name, "SARIMA(1,1,1)(1,1,1)[12]");
        assert_eq!(result.confidence_level, 0.95);
        for row in result.iter() {
            assert!(row.lower <= row.point && row.point <= row.upper);
        }
    }

    #[test]
    fn test_wider_level_gives_wider_interval() {
        let h = history(36);
        let narrow = ForecastEngine::new(EngineOptions {
            confidence_level: 0.8,
            ..EngineOptions::default()
        })
        .unwrap()
        .forecast(&h, 3)
        .unwrap();
        let wide = ForecastEngine::default().forecast(&h, 3).unwrap();
        assert_eq!(narrow.point, wide.point);
        for i in 0..3 {
            assert!(narrow.interval_width(i).unwrap() <= wide.interval_width(i).unwrap());
        }
    }

    #[test]
    fn test_bounds_rejects_bad_variance() {
        let engine = ForecastEngine::default();
        assert!(engine.bounds(100.0, f64::NAN).is_none());
        assert!(engine.bounds(f64::INFINITY, 1.0).is_none());
        assert!(engine.bounds(100.0, -5.0).is_none());
        // Rounding noise around zero collapses to a point interval
        assert_eq!(engine.bounds(100.0, -1e-12), Some((100.0, 100.0)));
        let (lo, hi) = engine.bounds(100.0, 4.0).unwrap();
        assert_relative_eq!(hi - lo, 4.0 * engine.z, epsilon = 1e-12);
    }
}
