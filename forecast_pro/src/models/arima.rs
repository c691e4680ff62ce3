//! ARIMA models for time series forecasting
//!
//! The series is differenced `d` times and an ARMA(p, q) process with a
//! constant is fitted to the result by exact Gaussian maximum likelihood.
//! The likelihood comes from a Kalman filter over the Harvey state-space form
//! with the innovation variance concentrated out. AR and MA coefficients are
//! searched through a partial-autocorrelation transform, so every candidate is
//! stationary and invertible.
//!
//! Point forecasts run the filtered state forward and are integrated back to
//! the original level. Their variance uses the psi weights of the integrated
//! model, which never decrease with the horizon.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ModelForecast, TrainedForecastModel};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use series_math::{difference, integrate, nelder_mead, solve, NelderMeadConfig};
use std::f64::consts::PI;
use std::fmt;
use tracing::{debug, info};

/// Unconstrained search range for transformed coefficients; tanh(6) ≈ 0.99999
const TRANSFORM_BOUND: f64 = 6.0;

/// Below this innovation variance the series is treated as deterministic
const MIN_SIGMA2: f64 = 1e-12;

/// Discarded leading draws when simulating
const SIMULATION_BURN_IN: usize = 100;

/// ARIMA model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    /// Create an order
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Dimension of the ARMA state vector
    pub fn state_dim(&self) -> usize {
        self.p.max(self.q + 1)
    }

    /// Mean parameters: intercept, AR and MA coefficients
    pub fn num_params(&self) -> usize {
        1 + self.p + self.q
    }

    /// Smallest series the model can be fitted to
    pub fn min_observations(&self) -> usize {
        self.d + 2
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Mean parameters of the differenced ARMA process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaParams {
    /// Mean of the differenced series (drift on the original scale when d = 1)
    pub intercept: f64,
    /// AR coefficients φ₁..φₚ
    pub ar: Vec<f64>,
    /// MA coefficients θ₁..θ_q, with the convention ε_t + θ₁ε_{t-1} + …
    pub ma: Vec<f64>,
}

impl ArimaParams {
    /// Draw `n` observations of an ARIMA process with these parameters.
    ///
    /// The integrated path starts at `start_level`.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        d: usize,
        n: usize,
        sigma: f64,
        start_level: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let noise = Normal::new(0.0, sigma)
            .map_err(|e| ForecastError::InvalidConfig(format!("Innovation scale: {}", e)))?;

        let total = n + SIMULATION_BURN_IN;
        let mut shocks = Vec::with_capacity(total);
        let mut w: Vec<f64> = Vec::with_capacity(total);
        for t in 0..total {
            let eps = noise.sample(rng);
            let mut value = self.intercept + eps;
            for (i, phi) in self.ar.iter().enumerate() {
                if t > i {
                    value += phi * (w[t - 1 - i] - self.intercept);
                }
            }
            for (j, theta) in self.ma.iter().enumerate() {
                if t > j {
                    value += theta * shocks[t - 1 - j];
                }
            }
            shocks.push(eps);
            w.push(value);
        }

        let mut path = w.split_off(SIMULATION_BURN_IN);
        for _ in 0..d {
            let mut running = 0.0;
            for value in path.iter_mut() {
                running += *value;
                *value = running;
            }
        }
        Ok(path.into_iter().map(|v| v + start_level).collect())
    }
}

/// Map unconstrained values to the coefficients of a stationary AR polynomial
/// (partial autocorrelations `tanh(u)` fed through Durbin-Levinson).
fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let mut coefs: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for (j, u) in unconstrained.iter().enumerate() {
        let r = u.tanh();
        let mut next = vec![0.0; j + 1];
        for i in 0..j {
            next[i] = coefs[i] - r * coefs[j - 1 - i];
        }
        next[j] = r;
        coefs = next;
    }
    coefs
}

/// Inverse of [`constrain_stationary`]; `None` outside the stationary region
fn unconstrain_stationary(coefs: &[f64]) -> Option<Vec<f64>> {
    let k = coefs.len();
    let mut current = coefs.to_vec();
    let mut unconstrained = vec![0.0; k];
    for j in (0..k).rev() {
        let r = current[j];
        if r.abs() >= 1.0 {
            return None;
        }
        unconstrained[j] = r.atanh();
        let denom = 1.0 - r * r;
        current = (0..j)
            .map(|i| (current[i] + r * current[j - 1 - i]) / denom)
            .collect();
    }
    Some(unconstrained)
}

/// Coefficients of the product of two polynomials in B
fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Output of one pass of the Kalman filter with unit innovation variance
#[derive(Debug, Clone)]
struct FilterOutput {
    /// Σ v²/F
    weighted_ss: f64,
    /// Σ ln F
    log_det: f64,
    /// One-step-ahead prediction errors v_t
    innovations: Vec<f64>,
    /// Predicted state for the first period after the sample
    next_state: Vec<f64>,
}

impl FilterOutput {
    fn sigma2(&self) -> f64 {
        self.weighted_ss / self.innovations.len() as f64
    }

    /// Log-likelihood with σ² replaced by its maximum likelihood estimate
    fn concentrated_log_likelihood(&self) -> f64 {
        let n = self.innovations.len() as f64;
        -0.5 * (n * (2.0 * PI).ln() + n * self.sigma2().ln() + self.log_det + n)
    }
}

/// Harvey state-space matrices for an ARMA(p, q) process
#[derive(Debug, Clone)]
struct StateSpace {
    transition: Vec<Vec<f64>>,
    selection: Vec<f64>,
}

impl StateSpace {
    fn new(order: ArimaOrder, params: &ArimaParams) -> Self {
        let r = order.state_dim();
        let mut transition = vec![vec![0.0; r]; r];
        for (i, phi) in params.ar.iter().enumerate() {
            transition[i][0] = *phi;
        }
        for (i, row) in transition.iter_mut().enumerate().take(r - 1) {
            row[i + 1] = 1.0;
        }
        let mut selection = vec![0.0; r];
        selection[0] = 1.0;
        for (j, theta) in params.ma.iter().enumerate() {
            selection[j + 1] = *theta;
        }
        Self {
            transition,
            selection,
        }
    }

    fn dim(&self) -> usize {
        self.selection.len()
    }

    fn step_state(&self, state: &[f64]) -> Vec<f64> {
        self.transition
            .iter()
            .map(|row| row.iter().zip(state).map(|(t, a)| t * a).sum())
            .collect()
    }

    /// T P Tᵀ + R Rᵀ
    fn step_covariance(&self, cov: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let r = self.dim();
        let t = &self.transition;
        let tp: Vec<Vec<f64>> = (0..r)
            .map(|i| (0..r).map(|j| (0..r).map(|k| t[i][k] * cov[k][j]).sum()).collect())
            .collect();
        (0..r)
            .map(|i| {
                (0..r)
                    .map(|j| {
                        (0..r).map(|k| tp[i][k] * t[j][k]).sum::<f64>()
                            + self.selection[i] * self.selection[j]
                    })
                    .collect()
            })
            .collect()
    }

    /// Unconditional state covariance: solves P = T P Tᵀ + R Rᵀ
    fn stationary_covariance(&self) -> Option<Vec<Vec<f64>>> {
        let r = self.dim();
        let t = &self.transition;
        let size = r * r;
        let mut system = vec![vec![0.0; size]; size];
        let mut rhs = vec![0.0; size];
        for i in 0..r {
            for j in 0..r {
                let row = i * r + j;
                rhs[row] = self.selection[i] * self.selection[j];
                for k in 0..r {
                    for l in 0..r {
                        system[row][k * r + l] -= t[i][k] * t[j][l];
                    }
                }
                system[row][row] += 1.0;
            }
        }
        let flat = solve(&system, &rhs).ok()?;
        Some(flat.chunks(r).map(|row| row.to_vec()).collect())
    }

    fn filter(&self, deviations: &[f64]) -> Option<FilterOutput> {
        let r = self.dim();
        let mut state = vec![0.0; r];
        let mut cov = self.stationary_covariance()?;

        let mut weighted_ss = 0.0;
        let mut log_det = 0.0;
        let mut innovations = Vec::with_capacity(deviations.len());

        for &y in deviations {
            let v = y - state[0];
            let f = cov[0][0];
            if !(f.is_finite() && f > 0.0) {
                return None;
            }
            weighted_ss += v * v / f;
            log_det += f.ln();
            innovations.push(v);

            let gain: Vec<f64> = (0..r).map(|i| cov[i][0] / f).collect();
            let updated_state: Vec<f64> = (0..r).map(|i| state[i] + gain[i] * v).collect();
            let updated_cov: Vec<Vec<f64>> = (0..r)
                .map(|i| (0..r).map(|j| cov[i][j] - gain[i] * cov[0][j]).collect())
                .collect();

            state = self.step_state(&updated_state);
            cov = self.step_covariance(&updated_cov);
        }

        Some(FilterOutput {
            weighted_ss,
            log_det,
            innovations,
            next_state: state,
        })
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Likelihood optimiser settings
    optimizer: NelderMeadConfig,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            name: format!("ARIMA{}", order),
            order,
            optimizer: NelderMeadConfig {
                max_iter: 5000,
                ..NelderMeadConfig::default()
            },
        }
    }

    /// Get the model order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    fn params_from_vector(&self, x: &[f64]) -> ArimaParams {
        let p = self.order.p;
        ArimaParams {
            intercept: x[0],
            ar: constrain_stationary(&x[1..1 + p]),
            ma: constrain_stationary(&x[1 + p..])
                .into_iter()
                .map(|c| -c)
                .collect(),
        }
    }

    fn run_filter(&self, differenced: &[f64], params: &ArimaParams) -> Option<FilterOutput> {
        let deviations: Vec<f64> = differenced.iter().map(|w| w - params.intercept).collect();
        StateSpace::new(self.order, params).filter(&deviations)
    }

    fn initial_vector(&self, differenced: &[f64], mean: f64) -> Vec<f64> {
        let p = self.order.p;
        let q = self.order.q;
        let lag_one = series_math::stats::autocorrelations(differenced, 1)
            .ok()
            .and_then(|acf| acf.first().copied())
            .unwrap_or(0.0)
            .clamp(-0.5, 0.5);

        let mut ar_start = vec![0.0; p];
        if let Some(first) = ar_start.first_mut() {
            *first = lag_one;
        }
        let mut x = vec![mean];
        x.extend(unconstrain_stationary(&ar_start).unwrap_or_else(|| vec![0.0; p]));
        x.extend(vec![0.0; q]);
        x
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::new(crate::config::ARIMA_ORDER)
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, values: &[f64]) -> Result<TrainedArimaModel> {
        let order = self.order;
        if values.len() < order.min_observations() {
            return Err(ForecastError::ModelFitFailure(format!(
                "Too few points for {}: need at least {} observations, got {}",
                self.name,
                order.min_observations(),
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFitFailure(
                "Series contains non-finite values".to_string(),
            ));
        }

        let differenced = difference(values, order.d);
        let mean = series_math::stats::mean(&differenced)?;
        let spread = differenced
            .iter()
            .map(|w| (w - mean).abs())
            .fold(0.0_f64, f64::max);
        if spread <= 1e-10 * (1.0 + mean.abs()) {
            return Err(ForecastError::ModelFitFailure(
                "Degenerate series: differenced values are constant".to_string(),
            ));
        }

        let initial = self.initial_vector(&differenced, mean);
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(vec![(-TRANSFORM_BOUND, TRANSFORM_BOUND); order.p + order.q]);

        let objective = |x: &[f64]| {
            let params = self.params_from_vector(x);
            match self.run_filter(&differenced, &params) {
                Some(out) if out.sigma2() > MIN_SIGMA2 => -out.concentrated_log_likelihood(),
                _ => f64::INFINITY,
            }
        };
        let result = nelder_mead(objective, &initial, Some(bounds.as_slice()), &self.optimizer);
        debug!(
            iterations = result.iterations,
            converged = result.converged,
            neg_log_likelihood = result.value,
            "likelihood optimisation finished"
        );

        if !result.value.is_finite() {
            return Err(ForecastError::ModelFitFailure(
                "Likelihood could not be evaluated at any candidate parameters".to_string(),
            ));
        }
        if !result.converged {
            return Err(ForecastError::ModelFitFailure(format!(
                "Optimizer did not converge after {} iterations",
                result.iterations
            )));
        }

        let params = self.params_from_vector(&result.point);
        let output = self.run_filter(&differenced, &params).ok_or_else(|| {
            ForecastError::ModelFitFailure("Kalman filter failed at the optimum".to_string())
        })?;
        let sigma2 = output.sigma2();
        if !(sigma2.is_finite() && sigma2 > MIN_SIGMA2) {
            return Err(ForecastError::ModelFitFailure(format!(
                "Degenerate innovation variance {}",
                sigma2
            )));
        }

        let trained = TrainedArimaModel {
            name: self.name.clone(),
            order,
            log_likelihood: output.concentrated_log_likelihood(),
            sigma2,
            params,
            history: values.to_vec(),
            residuals: output.innovations,
            next_state: output.next_state,
            iterations: result.iterations,
        };
        info!(
            model = %trained.name,
            intercept = trained.params.intercept,
            ar = ?trained.params.ar,
            ma = ?trained.params.ma,
            sigma2 = trained.sigma2,
            "fitted model"
        );
        Ok(trained)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Trained ARIMA model
#[derive(Debug, Clone, Serialize)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Estimated mean parameters
    params: ArimaParams,
    /// Innovation variance
    sigma2: f64,
    /// Maximised log-likelihood
    log_likelihood: f64,
    /// Original (undifferenced) series
    #[serde(skip)]
    history: Vec<f64>,
    /// One-step-ahead errors on the differenced scale
    #[serde(skip)]
    residuals: Vec<f64>,
    /// Predicted state for the first forecast period
    #[serde(skip)]
    next_state: Vec<f64>,
    /// Optimiser iterations used
    iterations: usize,
}

impl TrainedArimaModel {
    /// Get the model order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Get the estimated parameters
    pub fn params(&self) -> &ArimaParams {
        &self.params
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Maximised log-likelihood
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Observations the likelihood was computed on
    pub fn nobs(&self) -> usize {
        self.residuals.len()
    }

    /// Estimated parameters including σ²
    fn num_estimated(&self) -> usize {
        self.order.num_params() + 1
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * self.num_estimated() as f64
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood + self.num_estimated() as f64 * (self.nobs() as f64).ln()
    }

    /// In-sample one-step-ahead predictions on the original scale
    pub fn fitted_values(&self) -> Vec<f64> {
        let d = self.order.d;
        self.history[d..]
            .iter()
            .zip(self.residuals.iter())
            .map(|(y, e)| y - e)
            .collect()
    }

    /// Psi weights ψ₀..ψ_{h-1} of the integrated model
    pub fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        // φ*(B) = φ(B)(1 - B)^d
        let mut ar_poly = vec![1.0];
        ar_poly.extend(self.params.ar.iter().map(|phi| -phi));
        for _ in 0..self.order.d {
            ar_poly = poly_mul(&ar_poly, &[1.0, -1.0]);
        }

        let mut psi = Vec::with_capacity(horizon);
        for j in 0..horizon {
            let mut value = if j == 0 {
                1.0
            } else {
                self.params.ma.get(j - 1).copied().unwrap_or(0.0)
            };
            for i in 1..=j.min(ar_poly.len() - 1) {
                value -= ar_poly[i] * psi[j - i];
            }
            psi.push(value);
        }
        psi
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizons: usize) -> Result<ModelForecast> {
        if self.history.is_empty() {
            return Err(ForecastError::ModelFitFailure(
                "Model has not been fitted to data".to_string(),
            ));
        }

        let space = StateSpace::new(self.order, &self.params);
        let mut state = self.next_state.clone();
        let mut differenced = Vec::with_capacity(horizons);
        for _ in 0..horizons {
            differenced.push(self.params.intercept + state[0]);
            state = space.step_state(&state);
        }
        let values = integrate(&differenced, &self.history, self.order.d)?;

        let mut cumulative = 0.0;
        let std_errors = self
            .psi_weights(horizons)
            .into_iter()
            .map(|psi| {
                cumulative += psi * psi;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect();

        ModelForecast::new(values, std_errors)
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TrainedArimaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Results", self.name)?;
        writeln!(f, "  Observations:   {}", self.history.len())?;
        writeln!(f, "  Log Likelihood: {:.3}", self.log_likelihood)?;
        writeln!(f, "  AIC:            {:.3}", self.aic())?;
        writeln!(f, "  BIC:            {:.3}", self.bic())?;
        writeln!(f, "  const:          {:.4}", self.params.intercept)?;
        for (i, phi) in self.params.ar.iter().enumerate() {
            writeln!(f, "  ar.L{}:          {:.4}", i + 1, phi)?;
        }
        for (i, theta) in self.params.ma.iter().enumerate() {
            writeln!(f, "  ma.L{}:          {:.4}", i + 1, theta)?;
        }
        write!(f, "  sigma2:         {:.4}", self.sigma2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_round_trip() {
        let coefs = constrain_stationary(&[0.4, -1.1]);
        let back = unconstrain_stationary(&coefs).unwrap();
        assert!((back[0] - 0.4).abs() < 1e-10);
        assert!((back[1] + 1.1).abs() < 1e-10);
    }

    #[test]
    fn test_transform_first_order_is_tanh() {
        let coefs = constrain_stationary(&[0.5]);
        assert!((coefs[0] - 0.5_f64.tanh()).abs() < 1e-12);
        assert!(unconstrain_stationary(&[1.0]).is_none());
    }

    #[test]
    fn test_stationary_covariance_ar1() {
        let params = ArimaParams {
            intercept: 0.0,
            ar: vec![0.5],
            ma: vec![],
        };
        let space = StateSpace::new(ArimaOrder::new(1, 0, 0), &params);
        let cov = space.stationary_covariance().unwrap();
        // Var = 1 / (1 - φ²)
        assert!((cov[0][0] - 1.0 / 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_stationary_covariance_arma11() {
        let params = ArimaParams {
            intercept: 0.0,
            ar: vec![0.5],
            ma: vec![0.3],
        };
        let space = StateSpace::new(ArimaOrder::new(1, 0, 1), &params);
        let cov = space.stationary_covariance().unwrap();
        // γ₀ = (1 + 2φθ + θ²) / (1 - φ²)
        let expected = (1.0 + 2.0 * 0.5 * 0.3 + 0.09) / 0.75;
        assert!((cov[0][0] - expected).abs() < 1e-10);
    }

    #[test]
    fn test_psi_weights_random_walk_with_ma() {
        let model = TrainedArimaModel {
            name: "ARIMA(0,1,1)".to_string(),
            order: ArimaOrder::new(0, 1, 1),
            params: ArimaParams {
                intercept: 0.0,
                ar: vec![],
                ma: vec![0.4],
            },
            sigma2: 1.0,
            log_likelihood: 0.0,
            history: vec![1.0, 2.0],
            residuals: vec![0.0],
            next_state: vec![0.0, 0.0],
            iterations: 0,
        };
        // ψ₀ = 1, ψ_j = 1 + θ afterwards
        let psi = model.psi_weights(4);
        assert_eq!(psi.len(), 4);
        assert!((psi[0] - 1.0).abs() < 1e-12);
        for value in &psi[1..] {
            assert!((value - 1.4).abs() < 1e-12);
        }
    }
}
