//! Differencing and its inverse
//!
//! `difference` applies the backward difference operator `d` times and
//! `integrate` undoes it for values that continue past the end of a known
//! series, which is how differenced-scale forecasts are brought back to the
//! original level.

use crate::{MathError, Result};
use num_traits::Float;

/// Apply the first difference `d` times.
///
/// Each pass shortens the series by one value. Differencing a series with
/// fewer than two values leaves nothing, so the result is empty.
pub fn difference<T: Float>(series: &[T], d: usize) -> Vec<T> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Integrate `d`-times differenced values that follow the end of `original`.
///
/// The starting point of every cumulative sum is the last value of the
/// matching intermediate difference of `original`.
pub fn integrate<T: Float>(differenced: &[T], original: &[T], d: usize) -> Result<Vec<T>> {
    if d == 0 {
        return Ok(differenced.to_vec());
    }
    if original.len() < d {
        return Err(MathError::InsufficientData(format!(
            "Integrating order {} needs at least {} original values, got {}",
            d,
            d,
            original.len()
        )));
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(original, level)
            .last()
            .copied()
            .ok_or_else(|| {
                MathError::InsufficientData(format!("No anchor value at difference level {}", level))
            })?;

        let mut running = anchor;
        for value in result.iter_mut() {
            running = running + *value;
            *value = running;
        }
    }

    Ok(result)
}

/// Rebuild a full series from its first `d` values and its `d`-th difference.
pub fn undifference<T: Float>(head: &[T], differenced: &[T], d: usize) -> Result<Vec<T>> {
    if head.len() != d {
        return Err(MathError::InvalidInput(format!(
            "Expected {} initial values, got {}",
            d,
            head.len()
        )));
    }

    let mut series = head.to_vec();
    let tail = integrate(differenced, head, d)?;
    series.extend(tail);
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_difference() {
        let series = [10.0, 12.0, 11.0, 13.0];
        assert_eq!(difference(&series, 1), vec![2.0, -1.0, 2.0]);
        assert_eq!(difference(&series, 0), series.to_vec());
    }

    #[test]
    fn test_second_difference() {
        let series = [1.0, 4.0, 9.0, 16.0, 25.0];
        assert_eq!(difference(&series, 2), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_difference_too_short() {
        assert!(difference(&[5.0_f64], 1).is_empty());
        assert!(difference::<f64>(&[], 1).is_empty());
    }

    #[test]
    fn test_integrate_continues_series() {
        let original = [10.0, 12.0, 11.0];
        let future_diffs = [1.0, 2.0];
        let levels = integrate(&future_diffs, &original, 1).unwrap();
        assert_eq!(levels, vec![12.0, 14.0]);
    }

    #[test]
    fn test_integrate_second_order() {
        // Quadratic continues: 36, 49 follow 1, 4, 9, 16, 25 with constant second difference 2
        let original = [1.0, 4.0, 9.0, 16.0, 25.0];
        let levels = integrate(&[2.0, 2.0], &original, 2).unwrap();
        assert_relative_eq!(levels[0], 36.0);
        assert_relative_eq!(levels[1], 49.0);
    }

    #[test]
    fn test_integrate_needs_history() {
        assert!(integrate(&[1.0], &[2.0_f64], 2).is_err());
    }

    #[test]
    fn test_round_trip_reproduces_series() {
        let series = [10.0, 12.0, 11.0, 13.0, 14.0, 16.0, 15.0, 17.0, 19.0, 20.0];
        for d in 1..=3 {
            let diffs = difference(&series, d);
            let rebuilt = undifference(&series[..d], &diffs, d).unwrap();
            assert_eq!(rebuilt.len(), series.len());
            for (a, b) in rebuilt.iter().zip(series.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-9);
            }
        }
    }
}
