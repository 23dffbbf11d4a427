//! Nelder-Mead simplex method with box constraints.
//!
//! Trial points are projected back into the box. The search stops once every
//! vertex agrees with the best vertex to a relative tolerance (with a small
//! absolute floor for coordinates near zero), when the evaluation budget runs
//! out, or when the cancel token is set.

use std::cmp::Ordering;

use super::cancel::CancelToken;
use super::error::{OptimizeError, OptimizeResult};

// Nelder-Mead parameters
const ALPHA: f64 = 1.0; // Reflection
const GAMMA: f64 = 2.0; // Expansion
const RHO: f64 = 0.5; // Contraction
const SIGMA: f64 = 0.5; // Shrink

/// Absolute floor on the convergence tolerance for coordinates near zero
const XTOL_ABS: f64 = 1e-12;

/// Options for [`minimize`]
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOptions {
    /// Lower bound applied to every coordinate
    pub lower_bound: f64,
    /// Upper bound applied to every coordinate
    pub upper_bound: f64,
    /// Offset of the initial simplex vertices from `x0`
    pub initial_step: f64,
    /// Relative coordinate tolerance for convergence
    pub xtol_rel: f64,
    /// Stop after this many objective evaluations
    pub max_evaluations: Option<usize>,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            lower_bound: -10.0,
            upper_bound: 2.0,
            initial_step: 0.1,
            xtol_rel: 1e-4,
            max_evaluations: None,
        }
    }
}

/// Why the search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    XtolReached,
    MaxEvaluations,
    Cancelled,
}

/// Best point found
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeResult {
    pub x: Vec<f64>,
    /// Objective at `x`; `+inf` if nothing was evaluated
    pub fun: f64,
    pub iterations: usize,
    pub nfev: usize,
    pub termination: Termination,
}

/// Counts evaluations and refuses to call the objective once a stop applies.
struct Evaluator<'a, F> {
    f: F,
    nfev: usize,
    max_evaluations: Option<usize>,
    cancel: &'a CancelToken,
    stop: Option<Termination>,
}

impl<F> Evaluator<'_, F>
where
    F: FnMut(&[f64]) -> f64,
{
    fn call(&mut self, x: &[f64]) -> Option<f64> {
        if self.cancel.is_cancelled() {
            self.stop = Some(Termination::Cancelled);
            return None;
        }
        if let Some(max) = self.max_evaluations {
            if self.nfev >= max {
                self.stop = Some(Termination::MaxEvaluations);
                return None;
            }
        }
        self.nfev += 1;
        Some((self.f)(x))
    }
}

/// Non-finite values sort after every finite one.
fn compare_f64_nan_safe(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn project(x: &mut [f64], options: &MinimizeOptions) {
    for xi in x.iter_mut() {
        *xi = xi.clamp(options.lower_bound, options.upper_bound);
    }
}

/// `from + coeff * (to - from)`, projected into the box
fn along(from: &[f64], to: &[f64], coeff: f64, options: &MinimizeOptions) -> Vec<f64> {
    let mut x: Vec<f64> = from
        .iter()
        .zip(to)
        .map(|(a, b)| a + coeff * (b - a))
        .collect();
    project(&mut x, options);
    x
}

fn validate(x0: &[f64], options: &MinimizeOptions) -> OptimizeResult<()> {
    let invalid = |context: String| Err(OptimizeError::InvalidInput { context });

    if x0.is_empty() {
        return invalid("nelder_mead: empty initial guess".to_string());
    }
    if !(options.lower_bound < options.upper_bound) {
        return invalid(format!(
            "nelder_mead: bounds [{}, {}] are empty",
            options.lower_bound, options.upper_bound
        ));
    }
    if !(options.initial_step > 0.0) {
        return invalid(format!(
            "nelder_mead: initial step {} must be positive",
            options.initial_step
        ));
    }
    if !(options.xtol_rel > 0.0) {
        return invalid(format!(
            "nelder_mead: xtol_rel {} must be positive",
            options.xtol_rel
        ));
    }
    if let Some(k) = x0
        .iter()
        .position(|&v| !(options.lower_bound..=options.upper_bound).contains(&v))
    {
        return invalid(format!(
            "nelder_mead: x0[{k}] = {} lies outside [{}, {}]",
            x0[k], options.lower_bound, options.upper_bound
        ));
    }
    Ok(())
}

/// First vertex is x0, the others step along each axis (inward at an upper bound).
fn initial_simplex(x0: &[f64], options: &MinimizeOptions) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        vertex[i] = if x0[i] + options.initial_step <= options.upper_bound {
            x0[i] + options.initial_step
        } else {
            x0[i] - options.initial_step
        };
        project(&mut vertex, options);
        simplex.push(vertex);
    }
    simplex
}

/// Every coordinate of every vertex within `xtol_rel` of the best vertex,
/// or within [`XTOL_ABS`] of it
fn converged(vertices: &[Vec<f64>], best: &[f64], xtol_rel: f64) -> bool {
    vertices.iter().all(|v| {
        v.iter().zip(best).all(|(&a, &b)| {
            (a - b).abs() <= (xtol_rel * 0.5 * (a.abs() + b.abs())).max(XTOL_ABS)
        })
    })
}

fn best_so_far(
    vertices: &[Vec<f64>],
    f_values: &[f64],
    x0: &[f64],
    iterations: usize,
    nfev: usize,
    termination: Termination,
) -> MinimizeResult {
    let best = (0..f_values.len()).min_by(|&a, &b| compare_f64_nan_safe(f_values[a], f_values[b]));
    let (x, fun) = match best {
        Some(i) => (vertices[i].clone(), f_values[i]),
        None => (x0.to_vec(), f64::INFINITY),
    };
    MinimizeResult {
        x,
        fun,
        iterations,
        nfev,
        termination,
    }
}

/// Minimize `f` starting from `x0` inside the box given by `options`.
pub fn minimize<F>(
    f: F,
    x0: &[f64],
    options: &MinimizeOptions,
    cancel: &CancelToken,
) -> OptimizeResult<MinimizeResult>
where
    F: FnMut(&[f64]) -> f64,
{
    validate(x0, options)?;
    let n = x0.len();

    let mut ev = Evaluator {
        f,
        nfev: 0,
        max_evaluations: options.max_evaluations,
        cancel,
        stop: None,
    };

    let mut vertices = initial_simplex(x0, options);
    let mut f_values = Vec::with_capacity(n + 1);
    let mut iterations = 0;

    macro_rules! eval_or_stop {
        ($x:expr) => {
            match ev.call($x) {
                Some(value) => value,
                None => {
                    let termination = ev.stop.unwrap_or(Termination::Cancelled);
                    return Ok(best_so_far(
                        &vertices[..f_values.len()],
                        &f_values,
                        x0,
                        iterations,
                        ev.nfev,
                        termination,
                    ));
                }
            }
        };
    }

    for i in 0..=n {
        let value = eval_or_stop!(&vertices[i]);
        f_values.push(value);
    }

    loop {
        // Sort simplex by function values (NaN-safe)
        let mut indices: Vec<usize> = (0..=n).collect();
        indices.sort_by(|&a, &b| compare_f64_nan_safe(f_values[a], f_values[b]));

        let best_idx = indices[0];
        let worst_idx = indices[n];
        let second_worst_idx = indices[n - 1];

        if f_values[best_idx].is_nan() {
            return Err(OptimizeError::NumericalError {
                message: "nelder_mead: all function values are NaN".to_string(),
            });
        }

        if converged(&vertices, &vertices[best_idx], options.xtol_rel) {
            return Ok(MinimizeResult {
                x: vertices[best_idx].clone(),
                fun: f_values[best_idx],
                iterations,
                nfev: ev.nfev,
                termination: Termination::XtolReached,
            });
        }
        iterations += 1;

        // Centroid of all vertices except worst
        let mut centroid = vec![0.0; n];
        for &idx in &indices[..n] {
            for (c, v) in centroid.iter_mut().zip(&vertices[idx]) {
                *c += v / n as f64;
            }
        }

        // Reflection: centroid + alpha * (centroid - worst)
        let reflected = along(&centroid, &vertices[worst_idx], -ALPHA, options);
        let f_reflected = eval_or_stop!(&reflected);

        if f_reflected < f_values[second_worst_idx] && f_reflected >= f_values[best_idx] {
            vertices[worst_idx] = reflected;
            f_values[worst_idx] = f_reflected;
            continue;
        }

        // Expansion
        if f_reflected < f_values[best_idx] {
            let expanded = along(&centroid, &reflected, GAMMA, options);
            let f_expanded = eval_or_stop!(&expanded);

            if f_expanded < f_reflected {
                vertices[worst_idx] = expanded;
                f_values[worst_idx] = f_expanded;
            } else {
                vertices[worst_idx] = reflected;
                f_values[worst_idx] = f_reflected;
            }
            continue;
        }

        // Contraction, outside if the reflection improved on the worst vertex
        let contracted = if f_reflected < f_values[worst_idx] {
            along(&centroid, &reflected, RHO, options)
        } else {
            along(&centroid, &vertices[worst_idx], RHO, options)
        };
        let f_contracted = eval_or_stop!(&contracted);

        if f_contracted < f_values[worst_idx].min(f_reflected) {
            vertices[worst_idx] = contracted;
            f_values[worst_idx] = f_contracted;
            continue;
        }

        // Shrink every vertex towards the best
        let best = vertices[best_idx].clone();
        for &idx in &indices[1..=n] {
            let shrunk = along(&best, &vertices[idx], SIGMA, options);
            let f_shrunk = eval_or_stop!(&shrunk);
            vertices[idx] = shrunk;
            f_values[idx] = f_shrunk;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> MinimizeOptions {
        MinimizeOptions {
            lower_bound: -10.0,
            upper_bound: 10.0,
            initial_step: 0.5,
            xtol_rel: 1e-8,
            max_evaluations: Some(20_000),
        }
    }

    #[test]
    fn test_quadratic_bowl() {
        let center = [1.0, -2.0, 0.5];
        let f = |x: &[f64]| x.iter().zip(&center).map(|(a, c)| (a - c) * (a - c)).sum::<f64>();

        let result = minimize(f, &[0.0, 0.0, 0.0], &options(), &CancelToken::new()).unwrap();
        assert_eq!(result.termination, Termination::XtolReached);
        for (x, c) in result.x.iter().zip(&center) {
            assert!((x - c).abs() < 1e-4, "{x} vs {c}");
        }
        assert!(result.fun < 1e-8);
    }

    #[test]
    fn test_converges_at_origin() {
        let f = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
        let result = minimize(f, &[0.7, -0.3], &options(), &CancelToken::new()).unwrap();

        assert_eq!(result.termination, Termination::XtolReached);
        assert!(result.nfev < 20_000);
        assert!(result.x.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_convergence_has_absolute_floor() {
        let at_zero = vec![0.0, 0.0];
        let nearby = vec![vec![0.0, 0.0], vec![5e-13, -5e-13]];
        assert!(converged(&nearby, &at_zero, 1e-4));
        let apart = vec![vec![0.0, 0.0], vec![1e-9, 0.0]];
        assert!(!converged(&apart, &at_zero, 1e-4));
    }

    #[test]
    fn test_rosenbrock() {
        let f = |x: &[f64]| {
            let a = 1.0 - x[0];
            let b = x[1] - x[0] * x[0];
            a * a + 100.0 * b * b
        };
        let result = minimize(f, &[-1.2, 1.0], &options(), &CancelToken::new()).unwrap();
        assert!((result.x[0] - 1.0).abs() < 1e-3);
        assert!((result.x[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_minimum_outside_box_lands_on_bound() {
        let opts = MinimizeOptions {
            lower_bound: -10.0,
            upper_bound: 2.0,
            ..options()
        };
        let f = |x: &[f64]| (x[0] - 5.0).powi(2) + (x[1] + 20.0).powi(2);

        let result = minimize(f, &[0.0, 0.0], &opts, &CancelToken::new()).unwrap();
        assert!((result.x[0] - 2.0).abs() < 1e-3);
        assert!((result.x[1] + 10.0).abs() < 1e-3);
        assert!(result.x.iter().all(|&v| (-10.0..=2.0).contains(&v)));
    }

    #[test]
    fn test_initial_simplex_steps_inward_at_upper_bound() {
        let opts = MinimizeOptions {
            upper_bound: 2.0,
            initial_step: 0.1,
            ..options()
        };
        let simplex = initial_simplex(&[2.0, 0.0], &opts);
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[1], vec![1.9, 0.0]);
        assert_eq!(simplex[2], vec![2.0, 0.1]);
    }

    #[test]
    fn test_respects_evaluation_budget() {
        let opts = MinimizeOptions {
            max_evaluations: Some(25),
            ..options()
        };
        let f = |x: &[f64]| x.iter().map(|v| (v - 3.0).powi(2)).sum::<f64>();

        let result = minimize(f, &[0.0; 4], &opts, &CancelToken::new()).unwrap();
        assert_eq!(result.termination, Termination::MaxEvaluations);
        assert_eq!(result.nfev, 25);
        assert!(result.fun < 36.0);
    }

    #[test]
    fn test_cancel_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = minimize(|_: &[f64]| 0.0, &[1.0, 2.0], &options(), &cancel).unwrap();
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.nfev, 0);
        assert_eq!(result.x, vec![1.0, 2.0]);
        assert_eq!(result.fun, f64::INFINITY);
    }

    #[test]
    fn test_cancel_from_objective() {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let mut calls = 0;
        let f = |x: &[f64]| {
            calls += 1;
            if calls == 40 {
                token.cancel();
            }
            x[0] * x[0] + x[1] * x[1]
        };

        let result = minimize(f, &[3.0, -4.0], &options(), &cancel).unwrap();
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.nfev, 40);
        assert!(result.fun < 25.0);
    }

    #[test]
    fn test_all_nan_is_numerical_error() {
        let err = minimize(|_: &[f64]| f64::NAN, &[0.0], &options(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, OptimizeError::NumericalError { .. }));
    }

    #[test]
    fn test_rejects_bad_input() {
        let cancel = CancelToken::new();
        let f = |_: &[f64]| 0.0;
        assert!(minimize(f, &[], &options(), &cancel).is_err());
        assert!(minimize(f, &[11.0], &options(), &cancel).is_err());

        let empty_box = MinimizeOptions {
            lower_bound: 1.0,
            upper_bound: 1.0,
            ..options()
        };
        assert!(minimize(f, &[1.0], &empty_box, &cancel).is_err());
    }
}
