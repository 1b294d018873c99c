//! State-space form of an ARMA process and its Kalman filter.
//!
//! The state follows the Harvey representation: the transition matrix is a
//! companion matrix whose first column holds the AR coefficients, the
//! selection vector is `[1, ma_1, ..., ma_{r-1}]` and the observation picks
//! the first state element. Everything is computed with unit innovation
//! variance; the variance is concentrated out of the likelihood and applied
//! by the caller.
//!
//! The filter starts from the presample-zero state: before the first
//! observation only the first innovation is unknown. This initialization
//! exists for every coefficient value, stationary or not, so the likelihood
//! is continuous across the unit circle and the search is never pushed back
//! inside it.

use faer::Mat;

/// Result of running the filter over a sample.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Concentrated Gaussian log-likelihood
    pub log_likelihood: f64,
    /// Maximum likelihood estimate of the innovation variance
    pub sigma2: f64,
    pub nobs: usize,
    /// One-step-ahead predicted state after the last observation
    pub state: Vec<f64>,
    /// Variance of the filtered first state element at the last observation,
    /// on the unit innovation scale
    pub terminal_variance: f64,
}

#[derive(Debug, Clone)]
pub struct ArmaStateSpace {
    /// `ar[i]` is the coefficient on lag `i + 1`, zero-padded to `dim`
    ar: Vec<f64>,
    /// Selection vector R
    selection: Vec<f64>,
    dim: usize,
}

impl ArmaStateSpace {
    /// Build from AR coefficients (`ar[i]` on lag `i + 1`) and MA
    /// coefficients (`ma[i]` on lag `i + 1`).
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let dim = ar.len().max(ma.len() + 1);

        let mut ar_padded = vec![0.0; dim];
        ar_padded[..ar.len()].copy_from_slice(ar);

        let mut selection = vec![0.0; dim];
        selection[0] = 1.0;
        selection[1..=ma.len()].copy_from_slice(ma);

        Self {
            ar: ar_padded,
            selection,
            dim,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `R R'`: covariance of the first predicted state.
    fn initial_covariance(&self) -> Mat<f64> {
        Mat::from_fn(self.dim, self.dim, |i, j| {
            self.selection[i] * self.selection[j]
        })
    }

    /// `T x`
    fn advance_state(&self, x: &[f64]) -> Vec<f64> {
        (0..self.dim)
            .map(|i| self.ar[i] * x[0] + shifted(x, i))
            .collect()
    }

    /// `T P T' + R R'`, using the companion structure of `T`.
    fn advance_covariance(&self, p: &Mat<f64>) -> Mat<f64> {
        let dim = self.dim;
        let tp = Mat::from_fn(dim, dim, |i, j| {
            let below = if i + 1 < dim { p[(i + 1, j)] } else { 0.0 };
            self.ar[i] * p[(0, j)] + below
        });
        Mat::from_fn(dim, dim, |i, j| {
            let right = if j + 1 < dim { tp[(i, j + 1)] } else { 0.0 };
            tp[(i, 0)] * self.ar[j] + right + self.selection[i] * self.selection[j]
        })
    }

    /// Run the Kalman filter over `observations`.
    ///
    /// Returns `None` if the recursion breaks down numerically.
    pub fn filter(&self, observations: &[f64]) -> Option<FilterOutput> {
        let dim = self.dim;
        let mut p = self.initial_covariance();
        let mut a = vec![0.0; dim];

        let mut sum_log_f = 0.0;
        let mut sum_sq = 0.0;
        let mut terminal_variance = p[(0, 0)];

        for &y in observations {
            let f = p[(0, 0)];
            if !(f.is_finite() && f > 0.0) {
                return None;
            }
            let v = y - a[0];

            let filtered_state: Vec<f64> = (0..dim).map(|i| a[i] + p[(i, 0)] * v / f).collect();
            let filtered_cov = Mat::from_fn(dim, dim, |i, j| p[(i, j)] - p[(i, 0)] * p[(0, j)] / f);
            terminal_variance = filtered_cov[(0, 0)];

            sum_log_f += f.ln();
            sum_sq += v * v / f;

            a = self.advance_state(&filtered_state);
            p = self.advance_covariance(&filtered_cov);
        }

        let nobs = observations.len();
        if nobs == 0 {
            return None;
        }

        let n = nobs as f64;
        let sigma2 = (sum_sq / n).max(f64::MIN_POSITIVE);
        let log_likelihood =
            -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0) - 0.5 * sum_log_f;

        log_likelihood.is_finite().then_some(FilterOutput {
            log_likelihood,
            sigma2,
            nobs,
            state: a,
            terminal_variance,
        })
    }

    /// Forecast means of the next `horizon` observations.
    pub fn forecast_means(&self, output: &FilterOutput, horizon: usize) -> Vec<f64> {
        let mut a = output.state.clone();
        let mut means = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            means.push(a[0]);
            a = self.advance_state(&a);
        }
        means
    }
}

fn shifted(x: &[f64], i: usize) -> f64 {
    x.get(i + 1).copied().unwrap_or(0.0)
}
