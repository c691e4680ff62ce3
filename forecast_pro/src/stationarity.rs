//! Augmented Dickey-Fuller stationarity diagnostic
//!
//! The test regresses Δy_t on a constant, y_{t-1} and k lagged differences.
//! The lag order is chosen by AIC over a common sample and the regression is
//! refitted with the chosen order. P-values use MacKinnon's (1994) response
//! surface and critical values MacKinnon's (2010) finite-sample tables, both
//! for the constant-only case.

use crate::config::STATIONARITY_SIGNIFICANCE;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use series_math::{ols, MathError, OlsFit};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Fewest observations the diagnostic accepts
pub const MIN_OBSERVATIONS: usize = 8;

// MacKinnon (1994) p-value surface, constant term, one series
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) critical value surfaces, constant term, one series
const CRITICAL_SURFACES: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.04]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Outcome of the stationarity verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Stationary,
    NonStationary,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Stationary => write!(f, "stationary"),
            Verdict::NonStationary => write!(f, "non-stationary"),
        }
    }
}

/// Result of an ADF test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticResult {
    /// t statistic of the lagged level coefficient
    pub statistic: f64,
    /// Approximate p-value under the unit-root null
    pub p_value: f64,
    /// Critical values keyed by "1%", "5%" and "10%"
    pub critical_values: BTreeMap<String, f64>,
    /// Stationary iff the p-value is below the significance level
    pub verdict: Verdict,
    /// Lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
}

impl DiagnosticResult {
    /// Check if the unit-root null was rejected
    pub fn is_stationary(&self) -> bool {
        self.verdict == Verdict::Stationary
    }
}

/// ADF test settings
#[derive(Debug, Clone)]
pub struct AdfTest {
    max_lag: Option<usize>,
    significance: f64,
}

impl Default for AdfTest {
    fn default() -> Self {
        Self {
            max_lag: None,
            significance: STATIONARITY_SIGNIFICANCE,
        }
    }
}

impl AdfTest {
    /// Create a test with automatic lag selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the lag search at `max_lag` instead of Schwert's rule
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    /// Significance level used for the verdict
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    /// Run the test on a level series
    pub fn run(&self, values: &[f64]) -> Result<DiagnosticResult> {
        let n = values.len();
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: n,
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MalformedInput(
                "Stationarity test requires finite values".to_string(),
            ));
        }

        let max_lag = self.max_lag.unwrap_or_else(|| schwert_max_lag(n)).min(n / 2 - 2);
        let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

        let mut best: Option<(usize, f64)> = None;
        for lag in 0..=max_lag {
            let fit = match regress(values, &diffs, lag, max_lag) {
                Ok(fit) => fit,
                Err(_) => continue,
            };
            let aic = fit.aic();
            debug!(lag, aic, "adf lag candidate");
            if best.map_or(true, |(_, best_aic)| aic < best_aic) {
                best = Some((lag, aic));
            }
        }
        let used_lag = best.map(|(lag, _)| lag).ok_or_else(|| {
            MathError::CalculationError("No ADF regression could be estimated".to_string())
        })?;

        let fit = regress(values, &diffs, used_lag, used_lag)?;
        let statistic = fit
            .t_stat(1)
            .filter(|t| t.is_finite())
            .ok_or_else(|| {
                MathError::CalculationError(
                    "ADF statistic is undefined for a perfectly fitted series".to_string(),
                )
            })?;

        let p_value = mackinnon_p_value(statistic)?;
        let verdict = if p_value < self.significance {
            Verdict::Stationary
        } else {
            Verdict::NonStationary
        };

        Ok(DiagnosticResult {
            statistic,
            p_value,
            critical_values: critical_values(fit.nobs),
            verdict,
            used_lag,
            nobs: fit.nobs,
        })
    }
}

/// Run the ADF test with default settings
pub fn adf_test(values: &[f64]) -> Result<DiagnosticResult> {
    AdfTest::new().run(values)
}

/// 12 (n / 100)^(1/4), rounded up
fn schwert_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Δy_t = α + γ y_{t-1} + Σ β_i Δy_{t-i}, over rows `start..` of the differences
///
/// The lagged level is centred on its sample mean. With a constant in the
/// regression this leaves γ and its t-statistic unchanged, and keeps the
/// normal equations well conditioned when the level dwarfs the changes.
fn regress(levels: &[f64], diffs: &[f64], lag: usize, start: usize) -> Result<OlsFit> {
    let rows = diffs.len().saturating_sub(start);
    let level_mean = if rows > 0 {
        levels[start..diffs.len()].iter().sum::<f64>() / rows as f64
    } else {
        0.0
    };
    let mut design = Vec::with_capacity(rows);
    let mut response = Vec::with_capacity(rows);
    for t in start..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(levels[t] - level_mean);
        row.extend((1..=lag).map(|i| diffs[t - i]));
        design.push(row);
        response.push(diffs[t]);
    }
    Ok(ols(&design, &response)?)
}

/// Approximate p-value of an ADF statistic
pub fn mackinnon_p_value(statistic: f64) -> Result<f64> {
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }
    let coefs: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z: f64 = coefs
        .iter()
        .enumerate()
        .map(|(i, c)| c * statistic.powi(i as i32))
        .sum();
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Standard normal: {}", e)))?;
    Ok(normal.cdf(z))
}

/// Finite-sample critical values for a regression with `nobs` observations
pub fn critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let inv = 1.0 / nobs as f64;
    CRITICAL_SURFACES
        .iter()
        .map(|(level, c)| {
            let value = c[0] + c[1] * inv + c[2] * inv.powi(2) + c[3] * inv.powi(3);
            (level.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p_value_is_monotone() {
        let a = mackinnon_p_value(-4.0).unwrap();
        let b = mackinnon_p_value(-2.0).unwrap();
        let c = mackinnon_p_value(0.5).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_p_value_clamps() {
        assert_eq!(mackinnon_p_value(3.0).unwrap(), 1.0);
        assert_eq!(mackinnon_p_value(-20.0).unwrap(), 0.0);
    }

    #[test]
    fn test_critical_values_ordering() {
        let cv = critical_values(100);
        assert!(cv["1%"] < cv["5%"]);
        assert!(cv["5%"] < cv["10%"]);
        assert!((cv["5%"] - (-2.8906)).abs() < 1e-3);
    }

    #[test]
    fn test_schwert_rule() {
        assert_eq!(schwert_max_lag(100), 12);
        assert_eq!(schwert_max_lag(10), 7);
    }
}
