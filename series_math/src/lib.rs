//! # Series Math
//!
//! Numerical building blocks for univariate time series models.
//! This crate provides differencing and integration, dense linear algebra
//! with ordinary least squares, a bounded Nelder-Mead minimiser and a few
//! descriptive statistics used by the forecasting pipeline.

use thiserror::Error;

pub mod diff;
pub mod linalg;
pub mod optimize;
pub mod stats;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use diff::{difference, integrate};
pub use linalg::{ols, solve, OlsFit};
pub use optimize::{nelder_mead, NelderMeadConfig, NelderMeadResult};
