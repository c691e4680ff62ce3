//! Error types for the forecast_pro crate

use polars::prelude::PolarsError;
use series_math::MathError;
use thiserror::Error;

/// Custom error types for the forecast_pro crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The raw table does not have the expected shape or holds unusable values
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A time cell could not be parsed with the configured format
    #[error("Invalid timestamp '{value}' in row {row} (expected format '{format}')")]
    InvalidTimestamp {
        row: usize,
        value: String,
        format: String,
    },

    /// The same timestamp appears more than once
    #[error("Duplicate timestamp '{timestamp}' in rows {first_row} and {second_row}")]
    DuplicateTimestamp {
        timestamp: String,
        first_row: usize,
        second_row: usize,
    },

    /// Too few observations for the requested computation
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The model could not be estimated
    #[error("Model fit failure: {0}")]
    ModelFitFailure(String),

    /// Requested forecast horizon outside the supported range
    #[error("Invalid horizon: {steps} (supported range is {min}..={max})")]
    InvalidHorizon { steps: usize, min: usize, max: usize },

    /// The time index has no single step and fallback is disabled
    #[error("Irregular frequency: {0}")]
    IrregularFrequency(String),

    /// Shifting a timestamp left the representable date range
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(String),

    /// Error from invalid configuration values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    /// True for errors caused by the supplied data or settings ("bad input")
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ForecastError::MalformedInput(_)
                | ForecastError::InvalidTimestamp { .. }
                | ForecastError::DuplicateTimestamp { .. }
                | ForecastError::InvalidHorizon { .. }
                | ForecastError::IrregularFrequency(_)
                | ForecastError::InvalidConfig(_)
                | ForecastError::CsvError(_)
                | ForecastError::PolarsError(_)
        )
    }

    /// True when the model itself could not be estimated
    pub fn is_model_error(&self) -> bool {
        matches!(self, ForecastError::ModelFitFailure(_))
    }
}
