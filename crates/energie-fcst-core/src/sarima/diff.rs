//! Differencing and lag polynomial utilities.
//!
//! Lag polynomials are stored in full form: `poly[k]` is the coefficient of
//! `B^k`, with `poly[0] == 1`.

/// Multiply two lag polynomials.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Expand `1 + sign * (c_1 B^s + c_2 B^2s + ...)` into full form.
pub fn lag_polynomial(coefficients: &[f64], sign: f64, spacing: usize) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * spacing + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * spacing] = sign * c;
    }
    poly
}

/// The differencing operator `(1 - B)^d (1 - B^s)^D` in full form.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let seasonal = lag_polynomial(&[1.0], -1.0, period);
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a full-form lag polynomial to `series`.
///
/// The first `poly.len() - 1` observations have no complete lag window
/// and are dropped.
pub fn apply_polynomial(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let lags = poly.len().saturating_sub(1);
    if series.len() <= lags {
        return Vec::new();
    }
    (lags..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// First `n` coefficients of the power series `numerator / denominator`.
///
/// With the MA polynomial over the product of the AR and differencing
/// polynomials these are the level-scale psi weights: the response of the
/// series `k` steps after a unit shock.
pub fn psi_weights(numerator: &[f64], denominator: &[f64], n: usize) -> Vec<f64> {
    let mut weights: Vec<f64> = Vec::with_capacity(n);
    for k in 0..n {
        let mut w = numerator.get(k).copied().unwrap_or(0.0);
        for m in 1..denominator.len().min(k + 1) {
            w -= denominator[m] * weights[k - m];
        }
        weights.push(w);
    }
    weights
}

/// Undo differencing for values that follow `history`.
///
/// Solves `poly(B) y_t = w_t` forward, seeding the lags from `history`.
pub fn integrate(differenced: &[f64], history: &[f64], poly: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    extended.reserve(differenced.len());
    for &w in differenced {
        let t = extended.len();
        let mut y = w;
        for (k, c) in poly.iter().enumerate().skip(1) {
            if t >= k {
                y -= c * extended[t - k];
            }
        }
        extended.push(y);
    }
    extended.split_off(history.len())
}
