//! Seasonal ARIMA order specification.

use crate::error::{ForecastError, Result};

/// SARIMA(p, d, q)(P, D, Q)\[s\] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaSpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub seasonal_p: usize,
    /// Seasonal differencing order (D)
    pub seasonal_d: usize,
    /// Seasonal MA order (Q)
    pub seasonal_q: usize,
    /// Seasonal period (s)
    pub period: usize,
}

impl SarimaSpec {
    pub fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal.0,
            seasonal_d: seasonal.1,
            seasonal_q: seasonal.2,
            period: seasonal.3,
        }
    }

    /// Number of estimated ARMA coefficients (the innovation variance is
    /// concentrated out and not counted here).
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Highest AR lag after multiplying the seasonal and non-seasonal parts.
    pub fn ar_lags(&self) -> usize {
        self.p + self.seasonal_p * self.period
    }

    /// Highest MA lag after multiplying the seasonal and non-seasonal parts.
    pub fn ma_lags(&self) -> usize {
        self.q + self.seasonal_q * self.period
    }

    /// Observations lost to differencing.
    pub fn differencing_lags(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// Dimension of the ARMA state vector.
    pub fn state_dim(&self) -> usize {
        self.ar_lags().max(self.ma_lags() + 1)
    }

    /// Smallest series length that leaves more differenced observations
    /// than estimated coefficients.
    pub fn min_observations(&self) -> usize {
        self.differencing_lags() + self.num_params() + 1
    }

    pub fn validate(&self) -> Result<()> {
        let seasonal_terms = self.seasonal_p + self.seasonal_d + self.seasonal_q;
        if seasonal_terms > 0 && self.period < 2 {
            return Err(ForecastError::InvalidParameter {
                param: "period".into(),
                value: self.period.to_string(),
                reason: "seasonal terms need a period of at least 2".into(),
            });
        }
        Ok(())
    }

    /// Model name, e.g. `SARIMA(1,1,1)(1,1,1)[12]`.
    pub fn name(&self) -> String {
        format!(
            "SARIMA({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}

impl Default for SarimaSpec {
    /// Monthly airline-style model with annual seasonality.
    fn default() -> Self {
        Self::new((1, 1, 1), (1, 1, 1, 12))
    }
}
