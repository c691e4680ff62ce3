//! # ForecastPro workspace
//!
//! Umbrella crate for the workspace members:
//!
//! - [`series_math`]: differencing, least squares, Nelder-Mead and basic statistics
//! - [`forecast_pro`]: series validation, stationarity diagnostic and ARIMA forecasting
//!
//! ## Example
//!
//! ```
//! use forecast_pro_workspace::forecast_pro::data::RawTable;
//! use forecast_pro_workspace::forecast_pro::{ForecastConfig, ForecastPipeline};
//!
//! let table = RawTable::from_rows(
//!     &["year", "value"],
//!     &[
//!         &["2015", "10"], &["2016", "12"], &["2017", "11"], &["2018", "13"], &["2019", "14"],
//!         &["2020", "16"], &["2021", "15"], &["2022", "17"], &["2023", "19"], &["2024", "20"],
//!     ],
//! );
//! let pipeline = ForecastPipeline::new(ForecastConfig::new().with_steps(2)).unwrap();
//! let report = pipeline.run_table(&table).unwrap();
//! assert_eq!(report.forecast.horizons(), 2);
//! ```
//!
//! Differencing and integration are exact inverses:
//!
//! ```
//! use forecast_pro_workspace::series_math::diff::{difference, undifference};
//!
//! let series = vec![10.0, 12.0, 11.0, 13.0, 14.0];
//! let diffs = difference(&series, 2);
//! assert_eq!(undifference(&series[..2], &diffs, 2).unwrap(), series);
//! ```

pub use forecast_pro;
pub use series_math;
