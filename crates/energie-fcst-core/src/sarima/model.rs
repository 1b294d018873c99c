//! Maximum likelihood estimation and forecasting for seasonal ARIMA.
//!
//! The series is differenced, the remaining seasonal ARMA is put in
//! state-space form and its Gaussian likelihood, conditional on a zero
//! presample, is maximized with Nelder-Mead. Coefficients are
//! unconstrained: neither stationarity nor invertibility is imposed on the
//! search.

use argmin::core::{CostFunction, Error as ArgminError, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use tracing::{debug, warn};

use super::diff::{
    apply_polynomial, differencing_polynomial, integrate, lag_polynomial, poly_mul, psi_weights,
};
use super::spec::SarimaSpec;
use super::statespace::{ArmaStateSpace, FilterOutput};
use crate::error::{ForecastError, Result};

/// Cost returned for parameters where the likelihood cannot be evaluated.
const PENALTY: f64 = 1e30;

/// Optimizer settings.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Maximum Nelder-Mead iterations
    pub max_iters: u64,
    /// Stop once the standard deviation of the simplex costs falls below this
    pub sd_tolerance: f64,
    /// Starting value for every coefficient
    pub initial_value: f64,
    /// Offset of the initial simplex vertices from the starting point
    pub initial_step: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            sd_tolerance: 1e-8,
            initial_value: 0.1,
            initial_step: 0.1,
        }
    }
}

impl FitOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_iters == 0 {
            return Err(invalid("max_iters", self.max_iters, "must be positive"));
        }
        if !(self.sd_tolerance.is_finite() && self.sd_tolerance > 0.0) {
            return Err(invalid(
                "sd_tolerance",
                self.sd_tolerance,
                "must be a positive number",
            ));
        }
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(invalid(
                "initial_step",
                self.initial_step,
                "must be a positive number",
            ));
        }
        if !self.initial_value.is_finite() {
            return Err(invalid("initial_value", self.initial_value, "must be finite"));
        }
        Ok(())
    }
}

fn invalid(param: &str, value: impl ToString, reason: &str) -> ForecastError {
    ForecastError::InvalidParameter {
        param: param.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Estimated seasonal ARMA coefficients.
///
/// Sign convention: `(1 - phi B)(1 - Phi B^s) w_t = (1 + theta B)(1 + Theta B^s) e_t`.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaCoefficients {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl SarimaCoefficients {
    /// Split a flat parameter vector ordered `[ar, ma, seasonal_ar, seasonal_ma]`.
    fn from_params(spec: &SarimaSpec, params: &[f64]) -> Self {
        let (ar, rest) = params.split_at(spec.p);
        let (ma, rest) = rest.split_at(spec.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(spec.seasonal_p);
        Self {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma[..spec.seasonal_q].to_vec(),
        }
    }

    /// Flat parameter vector in the order used by the optimizer.
    pub fn to_params(&self) -> Vec<f64> {
        let mut params = Vec::with_capacity(
            self.ar.len() + self.ma.len() + self.seasonal_ar.len() + self.seasonal_ma.len(),
        );
        params.extend_from_slice(&self.ar);
        params.extend_from_slice(&self.ma);
        params.extend_from_slice(&self.seasonal_ar);
        params.extend_from_slice(&self.seasonal_ma);
        params
    }

    /// `(1 - phi B)(1 - Phi B^s)` in full form.
    fn ar_polynomial(&self, period: usize) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ar, -1.0, 1),
            &lag_polynomial(&self.seasonal_ar, -1.0, period),
        )
    }

    /// `(1 + theta B)(1 + Theta B^s)` in full form.
    fn ma_polynomial(&self, period: usize) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ma, 1.0, 1),
            &lag_polynomial(&self.seasonal_ma, 1.0, period),
        )
    }

    /// State-space form of the multiplied-out seasonal ARMA.
    fn state_space(&self, period: usize) -> ArmaStateSpace {
        let ar: Vec<f64> = self.ar_polynomial(period).iter().skip(1).map(|c| -c).collect();
        ArmaStateSpace::new(&ar, &self.ma_polynomial(period)[1..])
    }
}

/// Mean negative log-likelihood of the differenced series.
struct NegLogLikelihood<'a> {
    spec: &'a SarimaSpec,
    differenced: &'a [f64],
}

impl NegLogLikelihood<'_> {
    fn evaluate(&self, params: &[f64]) -> f64 {
        let coefficients = SarimaCoefficients::from_params(self.spec, params);
        match coefficients.state_space(self.spec.period).filter(self.differenced) {
            Some(out) => -out.log_likelihood / out.nobs as f64,
            None => PENALTY,
        }
    }
}

impl CostFunction for NegLogLikelihood<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        let value = self.evaluate(param);
        Ok(if value.is_finite() { value } else { PENALTY })
    }
}

/// A fitted seasonal ARIMA model, ready to forecast from the end of its sample.
#[derive(Debug, Clone)]
pub struct SarimaFit {
    spec: SarimaSpec,
    coefficients: SarimaCoefficients,
    history: Vec<f64>,
    differencing: Vec<f64>,
    state_space: ArmaStateSpace,
    filter: FilterOutput,
    iterations: u64,
}

/// Point forecasts and forecast error variances on the original scale.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaForecast {
    pub point: Vec<f64>,
    pub variance: Vec<f64>,
}

/// Fit `spec` to `values` by exact maximum likelihood.
pub fn fit_sarima(values: &[f64], spec: &SarimaSpec, options: &FitOptions) -> Result<SarimaFit> {
    spec.validate()?;
    options.validate()?;

    if values.len() < spec.min_observations() {
        return Err(ForecastError::InsufficientHistory {
            needed: spec.min_observations(),
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(
            "series contains non-finite values".into(),
        ));
    }

    let differencing = differencing_polynomial(spec.d, spec.seasonal_d, spec.period);
    let differenced = apply_polynomial(values, &differencing);
    let problem = NegLogLikelihood {
        spec,
        differenced: &differenced,
    };

    let (params, iterations) = if spec.num_params() == 0 {
        (Vec::new(), 0)
    } else {
        minimize(problem, spec.num_params(), options)?
    };

    let coefficients = SarimaCoefficients::from_params(spec, &params);
    let state_space = coefficients.state_space(spec.period);
    let filter = state_space.filter(&differenced).ok_or_else(|| {
        ForecastError::Convergence("likelihood cannot be evaluated at the estimate".into())
    })?;

    debug!(
        model = %spec.name(),
        ar = ?coefficients.ar,
        ma = ?coefficients.ma,
        seasonal_ar = ?coefficients.seasonal_ar,
        seasonal_ma = ?coefficients.seasonal_ma,
        sigma2 = filter.sigma2,
        log_likelihood = filter.log_likelihood,
        "Fitted seasonal ARIMA"
    );

    Ok(SarimaFit {
        spec: *spec,
        coefficients,
        history: values.to_vec(),
        differencing,
        state_space,
        filter,
        iterations,
    })
}

fn minimize(problem: NegLogLikelihood<'_>, k: usize, options: &FitOptions) -> Result<(Vec<f64>, u64)> {
    let start = vec![options.initial_value; k];
    let mut simplex = vec![start.clone()];
    for i in 0..k {
        let mut vertex = start.clone();
        vertex[i] += options.initial_step;
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(options.sd_tolerance)
        .map_err(|e| invalid("sd_tolerance", options.sd_tolerance, &e.to_string()))?;

    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(options.max_iters))
        .run()
        .map_err(|e| ForecastError::Convergence(e.to_string()))?;

    let state = &result.state;
    let iterations = state.get_iter();
    let best_cost = state.get_best_cost();
    let converged = matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    );
    debug!(iterations, converged, best_cost, "Nelder-Mead finished");

    if !converged {
        warn!(iterations, "Likelihood optimization did not converge");
        return Err(ForecastError::Convergence(format!(
            "optimizer stopped after {} iterations: {:?}",
            iterations,
            state.get_termination_status()
        )));
    }
    if !best_cost.is_finite() || best_cost >= PENALTY {
        warn!(best_cost, "Likelihood optimization ended on an invalid point");
        return Err(ForecastError::Convergence(
            "no parameter value with a finite likelihood was found".into(),
        ));
    }

    let params = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| ForecastError::Convergence("optimizer returned no parameters".into()))?;
    Ok((params, iterations))
}

impl SarimaFit {
    pub fn spec(&self) -> &SarimaSpec {
        &self.spec
    }

    pub fn coefficients(&self) -> &SarimaCoefficients {
        &self.coefficients
    }

    /// Maximum likelihood estimate of the innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.filter.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.filter.log_likelihood
    }

    /// Differenced observations used in the likelihood.
    pub fn nobs(&self) -> usize {
        self.filter.nobs
    }

    /// Estimated parameters, counting the innovation variance.
    pub fn num_estimated(&self) -> usize {
        self.spec.num_params() + 1
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_estimated() as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + self.num_estimated() as f64 * (self.nobs() as f64).ln()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Forecast `horizon` steps past the end of the sample.
    ///
    /// The filtered state at the origin carries no uncertainty, so the
    /// h-step error is a sum of future innovations weighted by the
    /// level-scale psi weights of `ma / (ar * differencing)`. Time and memory
    /// are linear in `horizon`.
    pub fn forecast(&self, horizon: usize) -> SarimaForecast {
        let means = self.state_space.forecast_means(&self.filter, horizon);
        let point = integrate(&means, &self.history, &self.differencing);

        let period = self.spec.period;
        let denominator = poly_mul(&self.coefficients.ar_polynomial(period), &self.differencing);
        let psi = psi_weights(&self.coefficients.ma_polynomial(period), &denominator, horizon);

        let origin = self.filter.terminal_variance.max(0.0);
        let mut cumulative = 0.0;
        let variance = psi
            .iter()
            .map(|w| {
                cumulative += w * w;
                (cumulative + origin) * self.filter.sigma2
            })
            .collect();

        SarimaForecast { point, variance }
    }
}
