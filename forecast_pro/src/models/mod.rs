//! Forecasting models for time series data

use crate::error::{ForecastError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Point forecasts and their standard errors on the original scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelForecast {
    /// Forecasted values
    values: Vec<f64>,
    /// Standard error of each forecast
    std_errors: Vec<f64>,
}

impl ModelForecast {
    /// Create a new forecast
    pub fn new(values: Vec<f64>, std_errors: Vec<f64>) -> Result<Self> {
        if values.len() != std_errors.len() {
            return Err(ForecastError::ModelFitFailure(format!(
                "Values length ({}) doesn't match standard errors length ({})",
                values.len(),
                std_errors.len()
            )));
        }
        if std_errors.iter().any(|se| !se.is_finite() || *se < 0.0) {
            return Err(ForecastError::ModelFitFailure(
                "Forecast standard errors must be finite and non-negative".to_string(),
            ));
        }

        Ok(Self { values, std_errors })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the standard errors
    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// Two-sided normal intervals at `confidence_level`
    pub fn intervals(&self, confidence_level: f64) -> Result<Vec<(f64, f64)>> {
        let z = normal_quantile(confidence_level)?;
        Ok(self
            .values
            .iter()
            .zip(self.std_errors.iter())
            .map(|(v, se)| (v - z * se, v + z * se))
            .collect())
    }
}

/// Critical value of the standard normal for a two-sided interval
pub fn normal_quantile(confidence_level: f64) -> Result<f64> {
    if confidence_level <= 0.0 || confidence_level >= 1.0 {
        return Err(ForecastError::InvalidConfig(
            "Confidence level must be between 0 and 1".to_string(),
        ));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidConfig(format!("Standard normal: {}", e)))?;
    Ok(normal.inverse_cdf((1.0 + confidence_level) / 2.0))
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizons: usize) -> Result<ModelForecast>;

    /// One-step-ahead errors over the training data
    fn residuals(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on an ordered, evenly spaced series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the series values
    fn train(&self, values: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
