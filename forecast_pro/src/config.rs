//! Pipeline configuration and fixed model constants

use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaOrder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Model order used by the forecast engine. Not caller-configurable.
pub const ARIMA_ORDER: ArimaOrder = ArimaOrder { p: 1, d: 1, q: 1 };

/// Two-sided coverage of every forecast interval
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Smallest accepted forecast horizon
pub const MIN_HORIZON: usize = 1;

/// Largest accepted forecast horizon
pub const MAX_HORIZON: usize = 5;

/// Year-only timestamps, as in annual survey data
pub const DEFAULT_TIME_FORMAT: &str = "%Y";

/// Significance level for the stationarity verdict
pub const STATIONARITY_SIGNIFICANCE: f64 = 0.05;

/// Below this many observations interval estimates are flagged as unreliable
pub const SMALL_SAMPLE_THRESHOLD: usize = 5;

/// Lags used for the residual whiteness check
pub const LJUNG_BOX_LAGS: usize = 10;

/// Settings a caller may change between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of future periods to forecast
    pub steps: usize,
    /// strftime-style format of the time column
    pub time_format: String,
    /// Fail on irregular time indexes instead of falling back to the last gap
    pub strict_frequency: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            steps: MIN_HORIZON,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            strict_frequency: false,
        }
    }
}

impl ForecastConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Set the forecast horizon
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the time column format
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Enable or disable strict frequency inference
    pub fn with_strict_frequency(mut self, strict: bool) -> Self {
        self.strict_frequency = strict;
        self
    }

    /// Check every setting against its accepted range
    pub fn validate(&self) -> Result<()> {
        validate_horizon(self.steps)?;
        if self.time_format.trim().is_empty() {
            return Err(ForecastError::InvalidConfig(
                "time_format must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reject horizons outside `MIN_HORIZON..=MAX_HORIZON`
pub fn validate_horizon(steps: usize) -> Result<()> {
    if !(MIN_HORIZON..=MAX_HORIZON).contains(&steps) {
        return Err(ForecastError::InvalidHorizon {
            steps,
            min: MIN_HORIZON,
            max: MAX_HORIZON,
        });
    }
    Ok(())
}
