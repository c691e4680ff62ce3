//! # Forecast Pro
//!
//! A Rust library for validating a univariate time series, checking it for a
//! unit root and forecasting it with a fixed-order ARIMA model.
//!
//! ## Features
//!
//! - Loading from CSV files, readers or polars `DataFrame`s
//! - Timestamp validation with a configurable format (year-only by default)
//! - Calendar-aware frequency inference with a last-gap fallback
//! - Augmented Dickey-Fuller stationarity diagnostic
//! - ARIMA(1,1,1) maximum likelihood fit with 95% forecast intervals
//! - Ljung-Box check of the fitted residuals
//! - A display timeline that extends two steps past the last forecast
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_pro::config::ForecastConfig;
//! use forecast_pro::data::DataLoader;
//! use forecast_pro::pipeline::ForecastPipeline;
//!
//! let table = DataLoader::from_csv("leisure.csv")?;
//! let pipeline = ForecastPipeline::new(ForecastConfig::new().with_steps(3))?;
//! let report = pipeline.run_table(&table)?;
//!
//! println!("{}", report);
//! # Ok::<(), forecast_pro::error::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod frequency;
pub mod models;
pub mod pipeline;
pub mod residuals;
pub mod stationarity;
pub mod timeline;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, RawTable, TimeSeries};
pub use crate::error::ForecastError;
pub use crate::forecast::{ForecastEngine, ForecastPoint, ForecastResult};
pub use crate::frequency::{Frequency, FrequencyResolution, FrequencySource};
pub use crate::models::{ForecastModel, TrainedForecastModel};
pub use crate::pipeline::{ForecastPipeline, PipelineReport, PipelineWarning};
pub use crate::stationarity::{DiagnosticResult, Verdict};
pub use crate::timeline::DisplayTimeline;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
