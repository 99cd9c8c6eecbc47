// Derivative-free local minimization for the low-dimensional fitting problems
// (2 to 5 parameters) solved by the cut and curve-fitting operators.
//
// Runs argmin's Nelder-Mead solver. Box bounds are handled by evaluating the
// objective at the candidate projected onto the box, plus a quadratic
// penalty on the distance outside it, so clamped simplex vertices still
// rank apart.

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;

use crate::error::{OperationError, Result, SeamlineError};

/// Configuration for the Nelder-Mead minimizer.
#[derive(Debug, Clone, Copy)]
pub struct MinimizeConfig {
    /// Maximum number of simplex iterations.
    pub max_iterations: u64,
    /// Convergence tolerance on the standard deviation of the objective
    /// values in the simplex.
    pub f_tolerance: f64,
    /// Edge length of the initial simplex along each axis.
    pub initial_step: f64,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            max_iterations: 4000,
            f_tolerance: 1e-14,
            initial_step: 0.05,
        }
    }
}

/// Result of a minimization run.
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best parameters found, inside the bounds.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: u64,
    /// Whether the tolerance was met before the iteration limit.
    pub converged: bool,
}

/// Weight of the squared distance outside the bounds.
const BOUND_PENALTY: f64 = 1e2;

/// Stand-in for objective values that are not finite.
const NON_FINITE_COST: f64 = 1e30;

fn project(x: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        Some(b) => x
            .iter()
            .zip(b)
            .map(|(xi, (lo, hi))| xi.clamp(*lo, *hi))
            .collect(),
        None => x.to_vec(),
    }
}

struct Objective<'a, F> {
    f: &'a F,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<F> CostFunction for Objective<'_, F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, Error> {
        let inside = project(x, self.bounds);
        let outside: f64 = x.iter().zip(&inside).map(|(a, b)| (a - b).powi(2)).sum();
        let value = (self.f)(&inside);
        if !value.is_finite() {
            return Ok(NON_FINITE_COST);
        }
        Ok(value + BOUND_PENALTY * outside)
    }
}

fn failed(e: &Error) -> SeamlineError {
    OperationError::Failed(format!("minimizer: {e}")).into()
}

/// Minimizes `f` starting from `x0`.
///
/// `bounds`, when given, holds one `(lower, upper)` pair per parameter.
///
/// # Errors
///
/// Returns [`OperationError::Failed`] if the solver cannot be set up or
/// aborts.
pub fn nelder_mead<F>(
    f: F,
    x0: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &MinimizeConfig,
) -> Result<MinimizeResult>
where
    F: Fn(&[f64]) -> f64,
{
    let start = project(x0, bounds);
    if start.is_empty() {
        return Ok(MinimizeResult {
            value: f(&start),
            x: start,
            iterations: 0,
            converged: true,
        });
    }

    // One step along each axis, stepping inwards at an upper bound.
    let mut simplex = Vec::with_capacity(start.len() + 1);
    simplex.push(start.clone());
    for i in 0..start.len() {
        let mut vertex = start.clone();
        let step = config.initial_step.max(0.05 * start[i].abs());
        vertex[i] += step;
        if bounds.is_some_and(|b| vertex[i] > b[i].1) {
            vertex[i] = start[i] - step;
        }
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(config.f_tolerance)
        .map_err(|e| failed(&e))?;
    let problem = Objective { f: &f, bounds };
    let res = Executor::new(problem, solver)
        .configure(|state| state.max_iters(config.max_iterations))
        .run()
        .map_err(|e| failed(&e))?;

    let state = res.state();
    let converged = matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    );
    let x = project(state.get_best_param().unwrap_or(&start), bounds);
    Ok(MinimizeResult {
        value: f(&x),
        x,
        iterations: state.get_iter(),
        converged,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_bowl() {
        let res = nelder_mead(
            |x| (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2),
            &[0.0, 0.0],
            None,
            &MinimizeConfig::default(),
        )
        .unwrap();
        assert!(res.converged);
        assert!((res.x[0] - 1.0).abs() < 1e-6);
        assert!((res.x[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn rosenbrock() {
        let res = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.2, 1.0],
            None,
            &MinimizeConfig::default(),
        )
        .unwrap();
        assert!((res.x[0] - 1.0).abs() < 1e-4, "x = {:?}", res.x);
        assert!((res.x[1] - 1.0).abs() < 1e-4, "x = {:?}", res.x);
    }

    #[test]
    fn bounds_are_respected() {
        let bounds = [(0.0, 1.0), (0.0, 1.0)];
        let res = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 0.5).powi(2),
            &[0.5, 0.5],
            Some(&bounds[..]),
            &MinimizeConfig::default(),
        )
        .unwrap();
        assert!(res.x[0] <= 1.0 && res.x[0] > 1.0 - 1e-6);
        assert!((res.x[1] - 0.5).abs() < 1e-6);
        assert!((res.value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iteration_limit_reports_no_convergence() {
        let config = MinimizeConfig {
            max_iterations: 2,
            ..MinimizeConfig::default()
        };
        let res = nelder_mead(|x| x[0].powi(2) + x[1].powi(2), &[3.0, 3.0], None, &config).unwrap();
        assert!(!res.converged);
        assert!(res.iterations <= 2);
    }
}
