use assert_approx_eq::assert_approx_eq;
use forecast_pro::error::ForecastError;
use forecast_pro::models::arima::ArimaParams;
use forecast_pro::residuals::ljung_box;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_ljung_box_hand_computed() {
    // ρ₁ = -0.75, Q₁ = n(n+2) ρ₁² / (n-1) = 4 * 6 * 0.5625 / 3
    let result = ljung_box(&[1.0, -1.0, 1.0, -1.0], 1).unwrap();
    assert_eq!(result.max_lag(), 1);
    assert_approx_eq!(result.statistics[0], 4.5, 1e-12);
    assert!(result.p_values[0] > 0.03 && result.p_values[0] < 0.04);
}

#[test]
fn test_ljung_box_detects_autocorrelation() {
    let params = ArimaParams {
        intercept: 0.0,
        ar: vec![0.9],
        ma: vec![],
    };
    let mut rng = StdRng::seed_from_u64(21);
    let series = params.simulate(0, 300, 1.0, 0.0, &mut rng).unwrap();

    let result = ljung_box(&series, 10).unwrap();
    assert_eq!(result.max_lag(), 10);
    assert!(result.min_p_value() < 1e-6);
    assert!(!result.is_white_noise(0.05));
    assert!(result.statistics.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_ljung_box_clamps_lags() {
    let result = ljung_box(&[0.3, -0.2, 0.5, -0.4, 0.1], 10).unwrap();
    assert_eq!(result.max_lag(), 4);
    assert_eq!(result.p_values.len(), 4);
    assert!(result.p_values.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn test_ljung_box_needs_data() {
    assert!(matches!(
        ljung_box(&[1.0, 2.0], 10),
        Err(ForecastError::InsufficientData { needed: 3, got: 2 })
    ));
    assert!(ljung_box(&[1.0, 1.0, 1.0, 1.0], 2).is_err());
}
