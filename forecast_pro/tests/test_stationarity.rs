use forecast_pro::error::ForecastError;
use forecast_pro::stationarity::{adf_test, critical_values, AdfTest, Verdict, MIN_OBSERVATIONS};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn leisure() -> Vec<f64> {
    vec![10.0, 12.0, 11.0, 13.0, 14.0, 16.0, 15.0, 17.0, 19.0, 20.0]
}

fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

#[test]
fn test_short_annual_series_produces_p_value() {
    let result = adf_test(&leisure()).unwrap();

    assert!(result.statistic.is_finite());
    assert!((0.0..=1.0).contains(&result.p_value));
    assert_eq!(result.critical_values.len(), 3);
    assert!(result.critical_values["1%"] < result.critical_values["5%"]);
    assert!(result.critical_values["5%"] < result.critical_values["10%"]);
    assert_eq!(
        result.verdict == Verdict::Stationary,
        result.p_value < 0.05
    );
}

#[test]
fn test_white_noise_is_stationary() {
    let result = adf_test(&white_noise(200, 11)).unwrap();

    assert!(result.statistic < result.critical_values["5%"]);
    assert!(result.p_value < 0.05);
    assert_eq!(result.verdict, Verdict::Stationary);
    assert!(result.is_stationary());
}

#[test]
fn test_explosive_growth_is_not_stationary() {
    let noise = white_noise(150, 5);
    let values: Vec<f64> = noise
        .iter()
        .enumerate()
        .map(|(t, e)| 10.0 * 1.02_f64.powi(t as i32) + 0.1 * e)
        .collect();

    let result = adf_test(&values).unwrap();
    assert!(result.p_value > 0.5);
    assert_eq!(result.verdict, Verdict::NonStationary);
}

#[test]
fn test_too_few_observations() {
    match adf_test(&[1.0, 2.0, 1.5, 3.0, 2.5]) {
        Err(ForecastError::InsufficientData { needed, got }) => {
            assert_eq!(needed, MIN_OBSERVATIONS);
            assert_eq!(got, 5);
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_constant_series_cannot_be_tested() {
    let result = adf_test(&[5.0; 20]);
    assert!(result.is_err());
    assert!(!matches!(result, Err(ForecastError::InsufficientData { .. })));
}

#[test]
fn test_fixed_lag() {
    let result = AdfTest::new()
        .with_max_lag(0)
        .run(&white_noise(100, 3))
        .unwrap();

    assert_eq!(result.used_lag, 0);
    assert_eq!(result.nobs, 99);
    assert_eq!(result.critical_values, critical_values(99));
}

#[test]
fn test_significance_controls_verdict() {
    let values = leisure();
    let strict = AdfTest::new().with_significance(0.0).run(&values).unwrap();
    let lax = AdfTest::new().with_significance(1.01).run(&values).unwrap();

    assert_eq!(strict.verdict, Verdict::NonStationary);
    assert_eq!(lax.verdict, Verdict::Stationary);
}

#[test]
fn test_statistic_ignores_level_offset() {
    let walk: Vec<f64> = white_noise(30, 21)
        .iter()
        .scan(0.0, |level, e| {
            *level += e;
            Some(*level)
        })
        .collect();
    let base = adf_test(&walk).unwrap();

    for offset in [1e3, 1e6, 1e9] {
        let shifted: Vec<f64> = walk.iter().map(|v| v + offset).collect();
        let result = adf_test(&shifted).unwrap();
        assert_eq!(result.used_lag, base.used_lag);
        assert!(
            (result.statistic - base.statistic).abs() < 1e-6,
            "offset {}: {} vs {}",
            offset,
            result.statistic,
            base.statistic
        );
    }
}

#[test]
fn test_short_series_at_high_level() {
    let values: Vec<f64> = leisure().iter().take(8).map(|v| v + 1e9).collect();
    let result = adf_test(&values).unwrap();
    assert!(result.statistic.is_finite());
    assert!((0.0..=1.0).contains(&result.p_value));
}
