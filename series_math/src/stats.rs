//! Descriptive statistics

use crate::{MathError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Mean of an empty slice is undefined".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator)
pub fn variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(
            "Variance needs at least 2 values".to_string(),
        ));
    }
    let m = mean(values)?;
    Ok(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64)
}

/// Sample autocorrelation at lags `1..=max_lag`, using the biased
/// (n denominator) autocovariance estimator.
pub fn autocorrelations(values: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let n = values.len();
    if max_lag >= n {
        return Err(MathError::InvalidInput(format!(
            "Lag {} is not smaller than series length {}",
            max_lag, n
        )));
    }
    let m = mean(values)?;
    let centered: Vec<f64> = values.iter().map(|v| v - m).collect();
    let c0: f64 = centered.iter().map(|v| v * v).sum();
    if c0 == 0.0 {
        return Err(MathError::CalculationError(
            "Autocorrelation of a constant series is undefined".to_string(),
        ));
    }

    Ok((1..=max_lag)
        .map(|lag| {
            centered
                .iter()
                .skip(lag)
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / c0
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(variance(&values).unwrap(), 32.0 / 7.0);
        assert!(mean(&[]).is_err());
        assert!(variance(&[1.0]).is_err());
    }

    #[test]
    fn test_alternating_series_autocorrelation() {
        let values = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let acf = autocorrelations(&values, 2).unwrap();
        assert_relative_eq!(acf[0], -5.0 / 6.0);
        assert_relative_eq!(acf[1], 4.0 / 6.0);
    }

    #[test]
    fn test_autocorrelation_errors() {
        assert!(autocorrelations(&[1.0, 2.0], 2).is_err());
        assert!(autocorrelations(&[3.0, 3.0, 3.0], 1).is_err());
    }
}
