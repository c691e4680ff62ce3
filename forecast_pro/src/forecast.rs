//! Forecast engine: fixed-order ARIMA fit plus dated interval forecasts

use crate::config::{validate_horizon, ARIMA_ORDER, CONFIDENCE_LEVEL};
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::models::arima::{ArimaModel, ArimaOrder, ArimaParams, TrainedArimaModel};
use crate::models::{ForecastModel, TrainedForecastModel};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// One forecast period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    /// Distance from the mean to either interval bound
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }
}

/// Fitted model description carried alongside a forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub order: ArimaOrder,
    pub params: ArimaParams,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
}

impl From<&TrainedArimaModel> for ModelSummary {
    fn from(model: &TrainedArimaModel) -> Self {
        Self {
            name: model.name().to_string(),
            order: model.order(),
            params: model.params().clone(),
            sigma2: model.sigma2(),
            log_likelihood: model.log_likelihood(),
            aic: model.aic(),
            bic: model.bic(),
            nobs: model.nobs(),
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: const={:.4} ar={:?} ma={:?} sigma2={:.4} loglik={:.3} aic={:.3}",
            self.name,
            self.params.intercept,
            self.params.ar,
            self.params.ma,
            self.sigma2,
            self.log_likelihood,
            self.aic
        )
    }
}

/// Dated forecasts with intervals at a fixed confidence level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    entries: Vec<ForecastPoint>,
    confidence_level: f64,
    model: ModelSummary,
}

impl ForecastResult {
    /// Get the forecast entries in time order
    pub fn entries(&self) -> &[ForecastPoint] {
        &self.entries
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.entries.len()
    }

    /// Two-sided coverage of the intervals
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Summary of the fitted model
    pub fn model(&self) -> &ModelSummary {
        &self.model
    }

    /// Point forecasts
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.mean).collect()
    }

    /// Forecast timestamps
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.entries.iter().map(|e| e.timestamp).collect()
    }

    /// (lower, upper) bounds
    pub fn intervals(&self) -> Vec<(f64, f64)> {
        self.entries.iter().map(|e| (e.lower, e.upper)).collect()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fits the fixed ARIMA order and turns it into dated forecasts
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    model: ArimaModel,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastEngine {
    /// Engine for the fixed ARIMA(1,1,1) model
    pub fn new() -> Self {
        Self {
            model: ArimaModel::new(ARIMA_ORDER),
        }
    }

    /// Fit the model to the series values
    pub fn fit(&self, series: &TimeSeries) -> Result<TrainedArimaModel> {
        info!(model = self.model.name(), observations = series.len(), "fitting model");
        self.model.train(series.values())
    }

    /// Forecast `steps` periods past the end of `series` with an already fitted model
    pub fn predict(
        &self,
        trained: &TrainedArimaModel,
        series: &TimeSeries,
        frequency: Frequency,
        steps: usize,
    ) -> Result<ForecastResult> {
        validate_horizon(steps)?;
        let last = series.last_timestamp().ok_or(ForecastError::InsufficientData {
            needed: 2,
            got: 0,
        })?;

        let timestamps = frequency.future_timestamps(last, steps)?;
        let forecast = trained.forecast(steps)?;
        let bounds = forecast.intervals(CONFIDENCE_LEVEL)?;

        let entries = timestamps
            .into_iter()
            .zip(forecast.values().iter())
            .zip(bounds)
            .map(|((timestamp, &mean), (lower, upper))| ForecastPoint {
                timestamp,
                mean,
                lower,
                upper,
            })
            .collect();

        Ok(ForecastResult {
            entries,
            confidence_level: CONFIDENCE_LEVEL,
            model: ModelSummary::from(trained),
        })
    }

    /// Validate the horizon, fit, then forecast
    pub fn forecast(
        &self,
        series: &TimeSeries,
        frequency: Frequency,
        steps: usize,
    ) -> Result<ForecastResult> {
        validate_horizon(steps)?;
        let trained = self.fit(series)?;
        self.predict(&trained, series, frequency, steps)
    }
}
