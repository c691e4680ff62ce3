//! Derivative-free minimisation
//!
//! Nelder-Mead simplex search with optional box bounds. Non-finite objective
//! values are treated as `+inf`, so an objective can reject a point simply by
//! returning `NaN` or infinity.

use serde::Serialize;

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Stop when the spread of simplex values drops below this
    pub f_tolerance: f64,
    /// Stop when the simplex diameter drops below this
    pub x_tolerance: f64,
    /// Offset used to build the initial simplex
    pub initial_step: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            f_tolerance: 1e-10,
            x_tolerance: 1e-8,
            initial_step: 0.1,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

/// Outcome of a minimisation
#[derive(Debug, Clone, Serialize)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations used
    pub iterations: usize,
    /// Whether a tolerance was met before `max_iter`
    pub converged: bool,
}

fn clamp(point: &mut [f64], bounds: Option<&[(f64, f64)]>) {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds.iter()) {
            *x = x.clamp(lo, hi);
        }
    }
}

fn evaluate<F: Fn(&[f64]) -> f64>(objective: &F, point: &[f64]) -> f64 {
    let value = objective(point);
    if value.is_finite() {
        value
    } else {
        f64::INFINITY
    }
}

/// Move `from` along the ray through `centroid` by `coef`.
fn along(centroid: &[f64], from: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(from.iter())
        .map(|(c, x)| c + coef * (c - x))
        .collect()
}

/// Minimise `objective` starting from `initial`.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let mut start = initial.to_vec();
    clamp(&mut start, bounds);

    if n == 0 {
        let value = evaluate(&objective, &start);
        return NelderMeadResult {
            point: start,
            value,
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex = vec![start.clone()];
    for i in 0..n {
        let mut vertex = start.clone();
        let step = if vertex[i].abs() > 1e-8 {
            config.initial_step * vertex[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        clamp(&mut vertex, bounds);
        if vertex[i] == start[i] {
            // Pinned against an upper bound, step the other way
            vertex[i] -= 2.0 * step;
            clamp(&mut vertex, bounds);
        }
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| evaluate(&objective, v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let spread = values[n] - values[0];
        let diameter = simplex[1..]
            .iter()
            .map(|v| {
                v.iter()
                    .zip(simplex[0].iter())
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0, f64::max)
            })
            .fold(0.0, f64::max);
        if values[0].is_finite() && (spread.abs() <= config.f_tolerance || diameter <= config.x_tolerance)
        {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
            .collect();

        let mut reflected = along(&centroid, &simplex[n], config.alpha);
        clamp(&mut reflected, bounds);
        let f_reflected = evaluate(&objective, &reflected);

        if f_reflected < values[0] {
            let mut expanded = along(&centroid, &simplex[n], config.alpha * config.gamma);
            clamp(&mut expanded, bounds);
            let f_expanded = evaluate(&objective, &expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let (mut contracted, threshold) = if f_reflected < values[n] {
            (along(&centroid, &simplex[n], config.alpha * config.rho), f_reflected)
        } else {
            (along(&centroid, &simplex[n], -config.rho), values[n])
        };
        clamp(&mut contracted, bounds);
        let f_contracted = evaluate(&objective, &contracted);
        if f_contracted < threshold {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        let best = simplex[0].clone();
        for i in 1..=n {
            let mut shrunk: Vec<f64> = best
                .iter()
                .zip(simplex[i].iter())
                .map(|(b, x)| b + config.sigma * (x - b))
                .collect();
            clamp(&mut shrunk, bounds);
            values[i] = evaluate(&objective, &shrunk);
            simplex[i] = shrunk;
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}
