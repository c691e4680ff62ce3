//! Dense linear algebra on row-major `Vec<Vec<f64>>` matrices
//!
//! Systems here are tiny (a handful of regressors or a state covariance), so
//! plain Gaussian elimination with partial pivoting is enough.

use crate::{MathError, Result};
use serde::Serialize;

const PIVOT_EPS: f64 = 1e-12;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    if n == 0 || b.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a square {}x{} system with {} right-hand values",
            n,
            n,
            b.len()
        )));
    }

    let mut m: Vec<Vec<f64>> = a
        .iter()
        .zip(b.iter())
        .map(|(row, &rhs)| {
            let mut r = row.clone();
            r.push(rhs);
            r
        })
        .collect();

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                m[i][col]
                    .abs()
                    .partial_cmp(&m[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if m[pivot][col].abs() < PIVOT_EPS * scale {
            return Err(MathError::SingularMatrix(format!(
                "Zero pivot in column {}",
                col
            )));
        }
        m.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor != 0.0 {
                for k in col..=n {
                    m[row][k] -= factor * m[col][k];
                }
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| m[row][k] * x[k]).sum();
        x[row] = (m[row][n] - tail) / m[row][row];
    }

    Ok(x)
}

/// Invert a square matrix column by column.
pub fn invert(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = a.len();
    let mut inverse = vec![vec![0.0; n]; n];
    for col in 0..n {
        let mut unit = vec![0.0; n];
        unit[col] = 1.0;
        let column = solve(a, &unit)?;
        for (row, value) in column.into_iter().enumerate() {
            inverse[row][col] = value;
        }
    }
    Ok(inverse)
}

/// Matrix product `a * b`.
pub fn matmul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let inner = b.len();
    let cols = b.first().map_or(0, |r| r.len());
    a.iter()
        .map(|row| {
            (0..cols)
                .map(|j| (0..inner).map(|k| row[k] * b[k][j]).sum())
                .collect()
        })
        .collect()
}

/// Matrix transpose.
pub fn transpose(a: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let cols = a.first().map_or(0, |r| r.len());
    (0..cols)
        .map(|j| a.iter().map(|row| row[j]).collect())
        .collect()
}

/// Ordinary least squares estimate with classical standard errors
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient
    pub std_errors: Vec<f64>,
    /// Residual sum of squares
    pub rss: f64,
    /// Number of observations
    pub nobs: usize,
}

impl OlsFit {
    /// Residual variance with the degrees-of-freedom correction
    pub fn sigma2(&self) -> f64 {
        let dof = self.nobs.saturating_sub(self.coefficients.len());
        if dof == 0 {
            f64::NAN
        } else {
            self.rss / dof as f64
        }
    }

    /// t statistic of one coefficient
    pub fn t_stat(&self, index: usize) -> Option<f64> {
        let beta = *self.coefficients.get(index)?;
        let se = *self.std_errors.get(index)?;
        Some(beta / se)
    }

    /// Akaike information criterion on the Gaussian log-likelihood
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let k = self.coefficients.len() as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.rss / n).ln() + 1.0);
        -2.0 * llf + 2.0 * k
    }
}

/// Fit `y = X b` by solving the normal equations.
///
/// `design` holds one row per observation.
pub fn ols(design: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    let nobs = y.len();
    if design.len() != nobs {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            design.len(),
            nobs
        )));
    }
    let k = design.first().map_or(0, |r| r.len());
    if k == 0 || nobs <= k {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations for {} regressors, got {}",
            k, k, nobs
        )));
    }

    let xt = transpose(design);
    let xtx = matmul(&xt, design);
    let xty: Vec<f64> = xt
        .iter()
        .map(|col| col.iter().zip(y.iter()).map(|(a, b)| a * b).sum())
        .collect();

    let coefficients = solve(&xtx, &xty)?;

    let rss: f64 = design
        .iter()
        .zip(y.iter())
        .map(|(row, &obs)| {
            let fitted: f64 = row.iter().zip(coefficients.iter()).map(|(x, b)| x * b).sum();
            (obs - fitted).powi(2)
        })
        .sum();

    let sigma2 = rss / (nobs - k) as f64;
    let xtx_inv = invert(&xtx)?;
    let std_errors = (0..k).map(|i| (sigma2 * xtx_inv[i][i]).sqrt()).collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        rss,
        nobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_two_by_two() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve(&a, &[3.0, 5.0]).unwrap();
        assert_relative_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let x = solve(&a, &[2.0, 3.0]).unwrap();
        assert_relative_eq!(x[0], 3.0);
        assert_relative_eq!(x[1], 2.0);
    }

    #[test]
    fn test_singular_matrix() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(matches!(
            solve(&a, &[1.0, 2.0]),
            Err(MathError::SingularMatrix(_))
        ));
    }

    #[test]
    fn test_invert_identity_product() {
        let a = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let inv = invert(&a).unwrap();
        let product = matmul(&a, &inv);
        assert_relative_eq!(product[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(product[0][1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(product[1][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ols_recovers_line() {
        // y = 1 + 2x with a small alternating perturbation
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let noise = [0.1, -0.1, 0.1, -0.1, 0.1, -0.1];
        let design: Vec<Vec<f64>> = xs.iter().map(|&x| vec![1.0, x]).collect();
        let y: Vec<f64> = xs
            .iter()
            .zip(noise.iter())
            .map(|(&x, &e)| 1.0 + 2.0 * x + e)
            .collect();

        let fit = ols(&design, &y).unwrap();
        assert_relative_eq!(fit.coefficients[0], 1.0, epsilon = 0.2);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 0.1);
        assert!(fit.std_errors.iter().all(|se| *se > 0.0));
        assert!(fit.sigma2() > 0.0);
        assert!(fit.t_stat(1).unwrap() > 10.0);
    }

    #[test]
    fn test_ols_needs_degrees_of_freedom() {
        let design = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
        assert!(matches!(
            ols(&design, &[1.0, 2.0]),
            Err(MathError::InsufficientData(_))
        ));
    }
}
