//! End-to-end run: validate, diagnose, fit, forecast and compose the axis
//!
//! Only validation, horizon and fit errors abort a run. Diagnostic problems
//! and small samples are collected as [`PipelineWarning`]s on the report.

use crate::config::{ForecastConfig, LJUNG_BOX_LAGS, SMALL_SAMPLE_THRESHOLD, STATIONARITY_SIGNIFICANCE};
use crate::data::{RawTable, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::forecast::{ForecastEngine, ForecastResult};
use crate::frequency::{Frequency, FrequencyResolution};
use crate::models::TrainedForecastModel;
use crate::residuals::{ljung_box, LjungBoxResult};
use crate::stationarity::{adf_test, DiagnosticResult};
use crate::timeline::DisplayTimeline;
use serde::Serialize;
use std::fmt;
use tracing::{info, info_span, warn};

/// Non-fatal condition noticed during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineWarning {
    /// Too few observations for the stationarity test
    InsufficientDiagnosticData { needed: usize, got: usize },
    /// The stationarity test could not be computed
    DiagnosticUnavailable(String),
    /// Interval estimates rest on very few observations
    SmallSample { observations: usize },
    /// The time index had no single step
    FrequencyFallback { frequency: Frequency },
    /// The residual whiteness check could not be computed
    ResidualCheckUnavailable(String),
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::InsufficientDiagnosticData { needed, got } => write!(
                f,
                "stationarity test skipped: needs at least {} observations, got {}",
                needed, got
            ),
            PipelineWarning::DiagnosticUnavailable(reason) => {
                write!(f, "stationarity test unavailable: {}", reason)
            }
            PipelineWarning::SmallSample { observations } => write!(
                f,
                "only {} observations: confidence intervals may be unreliable",
                observations
            ),
            PipelineWarning::FrequencyFallback { frequency } => write!(
                f,
                "no consistent frequency detected, using {}",
                frequency
            ),
            PipelineWarning::ResidualCheckUnavailable(reason) => {
                write!(f, "residual check unavailable: {}", reason)
            }
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub observations: usize,
    pub frequency: FrequencyResolution,
    pub diagnostic: Option<DiagnosticResult>,
    pub residual_check: Option<LjungBoxResult>,
    pub forecast: ForecastResult,
    pub timeline: DisplayTimeline,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineReport {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Data Check ===")?;
        writeln!(f, "Total data points: {}", self.observations)?;
        writeln!(f, "Frequency: {}", self.frequency.frequency)?;
        writeln!(f)?;

        writeln!(f, "=== Stationarity Test ===")?;
        match &self.diagnostic {
            Some(diag) => {
                writeln!(f, "ADF Statistic: {:.2}", diag.statistic)?;
                writeln!(f, "p-value: {:.4}", diag.p_value)?;
                for (level, value) in &diag.critical_values {
                    writeln!(f, "Critical value ({}): {:.3}", level, value)?;
                }
                writeln!(f, "Verdict: {}", diag.verdict)?;
            }
            None => writeln!(f, "Not available")?,
        }
        writeln!(f)?;

        writeln!(f, "=== Forecast Results ===")?;
        writeln!(f, "Model: {}", self.forecast.model())?;
        for (i, entry) in self.forecast.entries().iter().enumerate() {
            writeln!(f, "Step {} ({}):", i + 1, entry.timestamp)?;
            writeln!(f, "  Forecast: {:.2}", entry.mean)?;
            writeln!(
                f,
                "  {:.0}% CI: [{:.2}, {:.2}]",
                self.forecast.confidence_level() * 100.0,
                entry.lower,
                entry.upper
            )?;
        }
        if let Some(check) = &self.residual_check {
            writeln!(
                f,
                "Residual Ljung-Box Q({}): {:.3} (min p-value {:.4})",
                check.max_lag(),
                check.statistic(),
                check.min_p_value()
            )?;
        }
        writeln!(f, "Display range: {} to {}", self.timeline.start, self.timeline.end)?;

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "=== Warnings ===")?;
            for warning in &self.warnings {
                writeln!(f, "- {}", warning)?;
            }
        }
        Ok(())
    }
}

/// Runs every stage for one configuration
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: ForecastConfig,
    engine: ForecastEngine,
}

impl ForecastPipeline {
    /// Create a pipeline, rejecting invalid settings up front
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine: ForecastEngine::new(),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Run the stationarity test alone.
    ///
    /// A series the test cannot handle yields a warning instead of an error.
    pub fn diagnose(series: &TimeSeries) -> (Option<DiagnosticResult>, Option<PipelineWarning>) {
        match adf_test(series.values()) {
            Ok(diag) => {
                info!(
                    statistic = diag.statistic,
                    p_value = diag.p_value,
                    verdict = %diag.verdict,
                    "stationarity test"
                );
                (Some(diag), None)
            }
            Err(ForecastError::InsufficientData { needed, got }) => (
                None,
                Some(PipelineWarning::InsufficientDiagnosticData { needed, got }),
            ),
            Err(err) => (
                None,
                Some(PipelineWarning::DiagnosticUnavailable(err.to_string())),
            ),
        }
    }

    /// Validate a raw table with the configured time format, then run
    pub fn run_table(&self, table: &RawTable) -> Result<PipelineReport> {
        let series = TimeSeries::from_table(table, &self.config.time_format)?;
        self.run(&series)
    }

    /// Run on an already validated series
    pub fn run(&self, series: &TimeSeries) -> Result<PipelineReport> {
        let span = info_span!("pipeline", observations = series.len(), steps = self.config.steps);
        let _guard = span.enter();

        let mut warnings = Vec::new();
        info!("data check: {} observations", series.len());

        let frequency = Frequency::resolve(series.timestamps(), self.config.strict_frequency)?;
        if frequency.is_fallback() {
            warnings.push(PipelineWarning::FrequencyFallback {
                frequency: frequency.frequency,
            });
        }

        let (diagnostic, warning) = Self::diagnose(series);
        warnings.extend(warning);

        if series.len() < SMALL_SAMPLE_THRESHOLD {
            warnings.push(PipelineWarning::SmallSample {
                observations: series.len(),
            });
        }

        crate::config::validate_horizon(self.config.steps)?;
        let trained = self.engine.fit(series)?;
        let forecast = self
            .engine
            .predict(&trained, series, frequency.frequency, self.config.steps)?;
        info!(steps = forecast.horizons(), "forecast complete");

        let residual_check = match ljung_box(trained.residuals(), LJUNG_BOX_LAGS) {
            Ok(check) => {
                if !check.is_white_noise(STATIONARITY_SIGNIFICANCE) {
                    info!(min_p_value = check.min_p_value(), "residuals show autocorrelation");
                }
                Some(check)
            }
            Err(err) => {
                warnings.push(PipelineWarning::ResidualCheckUnavailable(err.to_string()));
                None
            }
        };

        let timeline = DisplayTimeline::compose(
            series.timestamps(),
            &forecast.timestamps(),
            frequency.frequency,
        )?;

        for warning in &warnings {
            warn!(%warning, "pipeline warning");
        }

        Ok(PipelineReport {
            observations: series.len(),
            frequency,
            diagnostic,
            residual_check,
            forecast,
            timeline,
            warnings,
        })
    }
}
