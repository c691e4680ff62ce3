use forecast_pro::error::ForecastError;
use pretty_assertions::assert_eq;
use series_math::MathError;
use std::io;

#[test]
fn test_error_messages() {
    let err = ForecastError::InvalidTimestamp {
        row: 2,
        value: "20x6".to_string(),
        format: "%Y".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Invalid timestamp '20x6' in row 2 (expected format '%Y')"
    );

    let err = ForecastError::DuplicateTimestamp {
        timestamp: "2015".to_string(),
        first_row: 1,
        second_row: 3,
    };
    assert_eq!(err.to_string(), "Duplicate timestamp '2015' in rows 1 and 3");

    let err = ForecastError::InvalidHorizon {
        steps: 0,
        min: 1,
        max: 5,
    };
    assert_eq!(
        err.to_string(),
        "Invalid horizon: 0 (supported range is 1..=5)"
    );

    let err = ForecastError::InsufficientData { needed: 8, got: 4 };
    assert_eq!(
        err.to_string(),
        "Insufficient data: need at least 8 observations, got 4"
    );
}

#[test]
fn test_error_classification() {
    assert!(ForecastError::MalformedInput("x".to_string()).is_input_error());
    assert!(ForecastError::IrregularFrequency("x".to_string()).is_input_error());
    assert!(!ForecastError::ModelFitFailure("x".to_string()).is_input_error());
    assert!(ForecastError::ModelFitFailure("x".to_string()).is_model_error());
    assert!(!ForecastError::InsufficientData { needed: 8, got: 2 }.is_input_error());
    assert!(!ForecastError::InvalidHorizon {
        steps: 9,
        min: 1,
        max: 5
    }
    .is_model_error());
}

#[test]
fn test_error_conversions() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
    let err: ForecastError = io_err.into();
    assert!(matches!(err, ForecastError::IoError(_)));

    let math_err = MathError::SingularMatrix("zero pivot".to_string());
    let err: ForecastError = math_err.into();
    assert_eq!(err.to_string(), "Math error: Singular matrix: zero pivot");

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ForecastError = json_err.into();
    assert!(matches!(err, ForecastError::JsonError(_)));
}
