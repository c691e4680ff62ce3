use chrono::{Duration, NaiveDate, NaiveDateTime};
use forecast_pro::config::{ForecastConfig, MAX_HORIZON};
use forecast_pro::data::{DataLoader, RawTable, TimeSeries};
use forecast_pro::error::ForecastError;
use forecast_pro::forecast::ForecastEngine;
use forecast_pro::frequency::{Frequency, FrequencySource};
use forecast_pro::pipeline::{ForecastPipeline, PipelineWarning};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::io::Write;
use tempfile::NamedTempFile;

fn year(y: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[fixture]
fn leisure_table() -> RawTable {
    RawTable::from_rows(
        &["year", "leisure_hours"],
        &[
            &["2015", "10"],
            &["2016", "12"],
            &["2017", "11"],
            &["2018", "13"],
            &["2019", "14"],
            &["2020", "16"],
            &["2021", "15"],
            &["2022", "17"],
            &["2023", "19"],
            &["2024", "20"],
        ],
    )
}

#[rstest]
fn test_one_step_annual_forecast(leisure_table: RawTable) {
    let pipeline = ForecastPipeline::new(ForecastConfig::new().with_steps(1)).unwrap();
    let report = pipeline.run_table(&leisure_table).unwrap();

    assert_eq!(report.observations, 10);
    assert_eq!(report.frequency.frequency, Frequency::Years(1));
    assert_eq!(report.frequency.source, FrequencySource::Inferred);

    let entries = report.forecast.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].timestamp, year(2025));
    assert!(entries[0].lower < entries[0].mean);
    assert!(entries[0].mean < entries[0].upper);
    assert_eq!(report.forecast.confidence_level(), 0.95);

    let diagnostic = report.diagnostic.as_ref().unwrap();
    assert!((0.0..=1.0).contains(&diagnostic.p_value));

    assert_eq!(report.timeline.start, year(2015));
    assert_eq!(report.timeline.end, year(2027));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[rstest]
fn test_five_step_intervals_widen(leisure_table: RawTable) {
    let pipeline = ForecastPipeline::new(ForecastConfig::new().with_steps(MAX_HORIZON)).unwrap();
    let report = pipeline.run_table(&leisure_table).unwrap();
    let entries = report.forecast.entries();

    assert_eq!(entries.len(), 5);
    assert_eq!(
        report.forecast.timestamps(),
        (2025..=2029).map(year).collect::<Vec<_>>()
    );
    for entry in entries {
        assert!(entry.lower <= entry.mean && entry.mean <= entry.upper);
    }
    for pair in entries.windows(2) {
        assert!(pair[1].half_width() >= pair[0].half_width() - 1e-9);
    }
    assert_eq!(report.timeline.end, year(2031));
}

#[rstest]
#[case(0)]
#[case(6)]
fn test_invalid_horizon_rejected(#[case] steps: usize) {
    let config = ForecastConfig::new().with_steps(steps);
    assert!(matches!(
        ForecastPipeline::new(config),
        Err(ForecastError::InvalidHorizon { .. })
    ));
}

#[test]
fn test_horizon_checked_before_fitting() {
    // A constant series cannot be fitted, so only an early check yields InvalidHorizon
    let timestamps = (2015..2025).map(year).collect();
    let series = TimeSeries::new(timestamps, vec![3.0; 10]).unwrap();
    let engine = ForecastEngine::new();

    assert!(matches!(
        engine.forecast(&series, Frequency::Years(1), 0),
        Err(ForecastError::InvalidHorizon { steps: 0, .. })
    ));
    assert!(matches!(
        engine.forecast(&series, Frequency::Years(1), 1),
        Err(ForecastError::ModelFitFailure(_))
    ));
}

#[test]
fn test_invalid_timestamp_aborts_run() {
    let table = RawTable::from_rows(
        &["year", "value"],
        &[&["2015", "1"], &["year 2016", "2"], &["2017", "3"]],
    );
    let pipeline = ForecastPipeline::new(ForecastConfig::new()).unwrap();
    let err = pipeline.run_table(&table).unwrap_err();

    assert!(matches!(err, ForecastError::InvalidTimestamp { row: 2, .. }));
    assert!(err.is_input_error());
}

#[test]
fn test_duplicate_year_aborts_run() {
    let table = RawTable::from_rows(
        &["year", "value"],
        &[&["2015", "1"], &["2016", "2"], &["2016", "3"]],
    );
    let pipeline = ForecastPipeline::new(ForecastConfig::new()).unwrap();
    assert!(matches!(
        pipeline.run_table(&table),
        Err(ForecastError::DuplicateTimestamp { .. })
    ));
}

#[test]
fn test_small_sample_is_warned() {
    let table = RawTable::from_rows(
        &["year", "value"],
        &[&["2015", "1"], &["2016", "3"], &["2017", "2"], &["2018", "5"]],
    );
    let pipeline = ForecastPipeline::new(ForecastConfig::new()).unwrap();
    let report = pipeline.run_table(&table).unwrap();

    assert!(report.diagnostic.is_none());
    assert_eq!(report.forecast.horizons(), 1);
    assert!(report
        .warnings
        .contains(&PipelineWarning::SmallSample { observations: 4 }));
    assert!(report
        .warnings
        .contains(&PipelineWarning::InsufficientDiagnosticData { needed: 8, got: 4 }));
}

#[test]
fn test_three_points_fit_with_warnings() {
    let table = RawTable::from_rows(
        &["year", "value"],
        &[&["2015", "1"], &["2016", "3"], &["2017", "2"]],
    );
    let pipeline = ForecastPipeline::new(ForecastConfig::new()).unwrap();
    let report = pipeline.run_table(&table).unwrap();

    assert_eq!(report.observations, 3);
    assert!(report.residual_check.is_none());
    assert!(report
        .warnings
        .contains(&PipelineWarning::SmallSample { observations: 3 }));
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, PipelineWarning::ResidualCheckUnavailable(_))));
}

#[test]
fn test_irregular_index_falls_back_or_fails_in_strict_mode() {
    let years = [2015, 2016, 2017, 2019, 2020, 2021, 2022, 2023, 2024];
    let values = [10.0, 12.0, 11.0, 14.0, 16.0, 15.0, 17.0, 19.0, 20.0];
    let series = TimeSeries::new(years.iter().map(|&y| year(y)).collect(), values.to_vec()).unwrap();

    let lenient = ForecastPipeline::new(ForecastConfig::new()).unwrap();
    let report = lenient.run(&series).unwrap();
    assert_eq!(report.frequency.source, FrequencySource::LastGap);
    assert_eq!(report.frequency.frequency, Frequency::Days(365));
    assert_eq!(
        report.forecast.entries()[0].timestamp,
        year(2024) + Duration::days(365)
    );
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, PipelineWarning::FrequencyFallback { .. })));

    let strict = ForecastPipeline::new(ForecastConfig::new().with_strict_frequency(true)).unwrap();
    assert!(matches!(
        strict.run(&series),
        Err(ForecastError::IrregularFrequency(_))
    ));
}

#[test]
fn test_csv_end_to_end_report() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "year,leisure_hours,source").unwrap();
    for (y, v) in (2015..=2024).zip([10, 12, 11, 13, 14, 16, 15, 17, 19, 20]) {
        writeln!(file, "{},{},survey", y, v).unwrap();
    }

    let table = DataLoader::from_csv(file.path()).unwrap();
    let pipeline = ForecastPipeline::new(ForecastConfig::new().with_steps(2)).unwrap();
    let report = pipeline.run_table(&table).unwrap();

    let text = report.to_string();
    assert!(text.contains("=== Data Check ==="));
    assert!(text.contains("Total data points: 10"));
    assert!(text.contains("=== Stationarity Test ==="));
    assert!(text.contains("ADF Statistic:"));
    assert!(text.contains("p-value:"));
    assert!(text.contains("=== Forecast Results ==="));
    assert!(text.contains("Step 2"));
    assert!(text.contains("95% CI: ["));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["observations"], 10);
    assert_eq!(json["forecast"]["entries"].as_array().unwrap().len(), 2);
    assert!(json["diagnostic"]["critical_values"]["5%"].is_number());
}

#[test]
fn test_config_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"steps": 3, "strict_frequency": true}}"#).unwrap();

    let config = ForecastConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.steps, 3);
    assert!(config.strict_frequency);
    assert_eq!(config.time_format, "%Y");
    assert!(config.validate().is_ok());

    let empty_format = ForecastConfig::new().with_time_format("  ");
    assert!(matches!(
        empty_format.validate(),
        Err(ForecastError::InvalidConfig(_))
    ));
}

#[test]
fn test_diagnose_short_series_warns() {
    let series = TimeSeries::new(
        (2015..2020).map(year).collect(),
        vec![1.0, 3.0, 2.0, 5.0, 4.0],
    )
    .unwrap();
    let (diagnostic, warning) = ForecastPipeline::diagnose(&series);

    assert!(diagnostic.is_none());
    assert_eq!(
        warning,
        Some(PipelineWarning::InsufficientDiagnosticData { needed: 8, got: 5 })
    );
}

#[rstest]
fn test_diagnose_leisure_series(leisure_table: RawTable) {
    let series = TimeSeries::from_table(&leisure_table, "%Y").unwrap();
    let (diagnostic, warning) = ForecastPipeline::diagnose(&series);

    assert!(diagnostic.is_some());
    assert_eq!(warning, None);
}

#[rstest]
fn test_engine_uses_fixed_order(leisure_table: RawTable) {
    let series = TimeSeries::from_table(&leisure_table, "%Y").unwrap();
    let trained = ForecastEngine::new().fit(&series).unwrap();
    assert_eq!(trained.order(), forecast_pro::config::ARIMA_ORDER);
}
