//! Matrix balancer for parallel paths.
//!
//! Solves the coupled system
//!
//! ```text
//! ΔP_i(Q_i) - P = 0      for every branch i
//! Σ Q_i - Q_total = 0
//! ```
//!
//! for the branch flows and the common drop `P` with damped Newton steps on
//! a finite-difference Jacobian. The starting split satisfies the linear
//! continuity row, and every full or partial Newton step keeps it satisfied.

use crate::config::{NetworkMethod, SolverConfig};
use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use crate::parallel::{BalanceResult, evaluate_branches, mean, spread};
use crate::series::PathDrop;
use nalgebra::DVector;
use tracing::debug;

/// Relative finite-difference step.
const FD_EPSILON: f64 = 1e-6;
/// Backtracking halvings before a step is abandoned.
const MAX_LINE_SEARCH: usize = 20;

/// Split `total` over `branches` paths by Newton iteration.
///
/// Same contract as [`crate::resolve_parallel`]: flow is conserved and the
/// loop stops on tolerance or at `max_iterations`. A singular Jacobian, e.g.
/// every branch insensitive to flow, is reported as [`SolverError::Singular`].
pub fn matrix_balance<F>(
    total: f64,
    branches: usize,
    eval: F,
    config: &SolverConfig,
    mut observer: Option<&mut dyn FnMut(usize, &[f64])>,
) -> SolverResult<BalanceResult>
where
    F: Fn(usize, f64) -> SolverResult<PathDrop> + Sync,
{
    if branches == 0 {
        return Err(SolverError::config("parallel block has no branches"));
    }
    if !total.is_finite() {
        return Err(SolverError::NumericalError {
            what: format!("total flow {total} is not finite"),
        });
    }
    let n = branches;
    let parallel = config.parallel_branches;

    let flows = vec![total / n as f64; n];
    if let Some(obs) = observer.as_mut() {
        obs(0, &flows);
    }
    let mut drops = evaluate_branches(&flows, &eval, parallel)?;
    let mut gap = spread(&drops);

    let mut x = DVector::from_iterator(
        n + 1,
        flows.iter().copied().chain([mean(drops.iter().map(|d| d.drop))]),
    );
    let mut floor = vec![(total.abs() / n as f64).max(1e-6); n];
    floor.push(x[n].abs().max(1.0));

    let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
        let q: Vec<f64> = x.rows(0, n).iter().copied().collect();
        let d = evaluate_branches(&q, &eval, parallel)?;
        let mut r = DVector::zeros(n + 1);
        for i in 0..n {
            r[i] = d[i].drop - x[n];
        }
        r[n] = q.iter().sum::<f64>() - total;
        Ok(r)
    };

    let mut iterations = 0;
    while gap >= config.pressure_tolerance && iterations < config.max_iterations && n > 1 {
        iterations += 1;
        let r = residual(&x)?;
        let mut jac = finite_difference_jacobian(&x, &residual, FD_EPSILON, &floor)?;
        // The linear parts are known exactly.
        jac.column_mut(n).fill(-1.0);
        jac.row_mut(n).fill(1.0);
        jac[(n, n)] = 0.0;
        let dx = jac.lu().solve(&(-r)).ok_or_else(|| SolverError::Singular {
            what: format!("matrix balancer Jacobian at iteration {iterations}"),
        })?;

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_LINE_SEARCH {
            let x_new = &x + alpha * &dx;
            let q: Vec<f64> = x_new.rows(0, n).iter().copied().collect();
            let d_new = evaluate_branches(&q, &eval, parallel)?;
            let gap_new = spread(&d_new);
            if gap_new < gap {
                accepted = Some((x_new, d_new, gap_new));
                break;
            }
            alpha *= 0.5;
        }

        let Some((x_new, d_new, gap_new)) = accepted else {
            debug!(iteration = iterations, spread_pa = gap, "matrix balancer stalled");
            break;
        };
        x = x_new;
        drops = d_new;
        gap = gap_new;
        if let Some(obs) = observer.as_mut() {
            let q: Vec<f64> = x.rows(0, n).iter().copied().collect();
            obs(iterations, &q);
        }
        debug!(iteration = iterations, spread_pa = gap, alpha, "matrix balancer step");
    }

    Ok(BalanceResult {
        flows: x.rows(0, n).iter().copied().collect(),
        drops,
        iterations,
        converged: gap < config.pressure_tolerance,
        spread: gap,
        method: NetworkMethod::Matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn power_law(r: Vec<f64>, n: f64) -> impl Fn(usize, f64) -> SolverResult<PathDrop> + Sync {
        move |i, q| {
            Ok(PathDrop {
                drop: r[i] * q.signum() * q.abs().powf(n),
                slope: n * r[i] * q.abs().powf(n - 1.0),
            })
        }
    }

    #[test]
    fn converges_to_quadratic_split() {
        let cfg = SolverConfig {
            pressure_tolerance: 1e-3,
            ..SolverConfig::default()
        };
        let out = matrix_balance(0.3, 2, power_law(vec![1e6, 4e6], 2.0), &cfg, None).unwrap();
        assert!(out.converged, "spread {}", out.spread);
        assert!((out.flows[0] - 0.2).abs() < 1e-6, "{:?}", out.flows);
        assert!((out.flows[1] - 0.1).abs() < 1e-6);
        assert_eq!(out.method, NetworkMethod::Matrix);
    }

    #[test]
    fn handles_mixed_exponents() {
        let eval = |i: usize, q: f64| -> SolverResult<PathDrop> {
            let (r, n) = [(2e5, 1.0), (5e6, 2.0), (8e5, 1.75)][i];
            Ok(PathDrop {
                drop: r * q.abs().powf(n) * q.signum(),
                slope: n * r * q.abs().powf(n - 1.0),
            })
        };
        let cfg = SolverConfig::default();
        let out = matrix_balance(0.25, 3, eval, &cfg, None).unwrap();
        assert!(out.converged, "spread {}", out.spread);
        assert!((out.total_flow() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn flow_insensitive_branches_are_singular() {
        let eval = |i: usize, _q: f64| -> SolverResult<PathDrop> {
            Ok(PathDrop {
                drop: if i == 0 { 100.0 } else { 200.0 },
                slope: 0.0,
            })
        };
        let err = matrix_balance(0.1, 2, eval, &SolverConfig::default(), None).unwrap_err();
        assert!(matches!(err, SolverError::Singular { .. }));
    }

    proptest! {
        #[test]
        fn conserves_flow_each_step(
            r in prop::collection::vec(1.0e4f64..1.0e7, 2..5),
            total in 1.0e-2f64..1.0,
        ) {
            let n = r.len();
            let mut sums = Vec::new();
            let mut record = |_: usize, flows: &[f64]| sums.push(flows.iter().sum::<f64>());
            let cfg = SolverConfig::default();
            matrix_balance(total, n, power_law(r, 2.0), &cfg, Some(&mut record)).unwrap();
            for s in sums {
                prop_assert!((s - total).abs() <= 1e-9);
            }
        }
    }
}
