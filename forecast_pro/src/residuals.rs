//! Residual whiteness check (Ljung-Box)

use crate::error::{ForecastError, Result};
use serde::Serialize;
use series_math::stats::autocorrelations;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Ljung-Box portmanteau statistics for lags 1..=k
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LjungBoxResult {
    /// Q statistic at each lag
    pub statistics: Vec<f64>,
    /// Upper tail probability of χ² with `lag` degrees of freedom
    pub p_values: Vec<f64>,
}

impl LjungBoxResult {
    /// Largest lag tested
    pub fn max_lag(&self) -> usize {
        self.statistics.len()
    }

    /// Q statistic at the largest lag
    pub fn statistic(&self) -> f64 {
        self.statistics.last().copied().unwrap_or(f64::NAN)
    }

    /// Smallest p-value over all lags
    pub fn min_p_value(&self) -> f64 {
        self.p_values.iter().copied().fold(1.0, f64::min)
    }

    /// No lag shows autocorrelation at level `alpha`
    pub fn is_white_noise(&self, alpha: f64) -> bool {
        self.p_values.iter().all(|p| *p > alpha)
    }
}

/// Q_k = n(n+2) Σ_{j≤k} ρ_j² / (n-j) for k = 1..=lags.
///
/// `lags` is reduced to `n - 1` for short series.
pub fn ljung_box(residuals: &[f64], lags: usize) -> Result<LjungBoxResult> {
    let n = residuals.len();
    if n < 3 {
        return Err(ForecastError::InsufficientData { needed: 3, got: n });
    }
    let lags = lags.min(n - 1);
    if lags == 0 {
        return Err(ForecastError::InvalidConfig(
            "Ljung-Box needs at least one lag".to_string(),
        ));
    }

    let rho = autocorrelations(residuals, lags)?;
    let nf = n as f64;

    let mut statistics = Vec::with_capacity(lags);
    let mut p_values = Vec::with_capacity(lags);
    let mut running = 0.0;
    for (i, r) in rho.iter().enumerate() {
        let lag = i + 1;
        running += r * r / (nf - lag as f64);
        let q = nf * (nf + 2.0) * running;
        let chi2 = ChiSquared::new(lag as f64)
            .map_err(|e| ForecastError::InvalidConfig(format!("Chi-squared: {}", e)))?;
        statistics.push(q);
        p_values.push(1.0 - chi2.cdf(q));
    }

    Ok(LjungBoxResult {
        statistics,
        p_values,
    })
}
