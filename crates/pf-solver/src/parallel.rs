//! Parallel-flow resolver.
//!
//! Branches share an inlet and an outlet, so at balance their pressure drops
//! agree. Starting from an equal split, each branch flow is scaled by
//! `(ΔP_mean / ΔP_i)^(1/n)` and the split renormalized to the total, until the
//! spread of drops falls under the pressure tolerance.

use crate::config::{NetworkMethod, SolverConfig};
use crate::error::{SolverError, SolverResult};
use crate::series::PathDrop;
use rayon::prelude::*;
use tracing::debug;

/// Split of a total flow over parallel paths.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceResult {
    /// m³/s per branch, summing to the total.
    pub flows: Vec<f64>,
    /// Pa per branch at `flows`.
    pub drops: Vec<PathDrop>,
    pub iterations: usize,
    pub converged: bool,
    /// `max - min` of the branch drops.
    pub spread: f64,
    pub method: NetworkMethod,
}

impl BalanceResult {
    pub fn mean_drop(&self) -> f64 {
        mean(self.drops.iter().map(|d| d.drop))
    }

    /// Slope of the combined block: conductances add.
    pub fn combined_slope(&self) -> f64 {
        let mut conductance = 0.0;
        for d in &self.drops {
            if d.slope <= 0.0 {
                return 0.0;
            }
            conductance += 1.0 / d.slope;
        }
        if conductance > 0.0 { 1.0 / conductance } else { 0.0 }
    }

    pub fn total_flow(&self) -> f64 {
        self.flows.iter().sum()
    }
}

/// Evaluate every branch at its flow, on the rayon pool when asked.
pub(crate) fn evaluate_branches<F>(flows: &[f64], eval: &F, parallel: bool) -> SolverResult<Vec<PathDrop>>
where
    F: Fn(usize, f64) -> SolverResult<PathDrop> + Sync,
{
    if parallel {
        flows
            .par_iter()
            .enumerate()
            .map(|(i, &q)| eval(i, q))
            .collect()
    } else {
        flows.iter().enumerate().map(|(i, &q)| eval(i, q)).collect()
    }
}

pub(crate) fn spread(drops: &[PathDrop]) -> f64 {
    let (lo, hi) = drops.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
        (lo.min(d.drop), hi.max(d.drop))
    });
    if drops.is_empty() { 0.0 } else { hi - lo }
}

pub(crate) fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

/// Split `total` over `branches` paths so their drops agree.
///
/// `eval(i, q)` gives the drop of branch `i` at flow `q`. `observer` sees the
/// flow vector after every update; the vector always sums to `total`.
pub fn resolve_parallel<F>(
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

    let mut flows = vec![total / branches as f64; branches];
    if let Some(obs) = observer.as_mut() {
        obs(0, &flows);
    }
    let mut drops = evaluate_branches(&flows, &eval, config.parallel_branches)?;
    let mut gap = spread(&drops);
    let inv_n = 1.0 / config.loss_exponent;
    let mut iterations = 0;

    while gap >= config.pressure_tolerance && iterations < config.max_iterations && branches > 1 {
        iterations += 1;
        let target = mean(drops.iter().map(|d| d.drop));
        let before = flows.clone();

        for (q, d) in flows.iter_mut().zip(&drops) {
            if *q > 0.0 && d.drop > 0.0 && target > 0.0 {
                *q *= (target / d.drop).powf(inv_n);
            } else if d.slope > 0.0 {
                *q += (target - d.drop) / d.slope;
            }
        }
        renormalize(&mut flows, total);

        if let Some(obs) = observer.as_mut() {
            obs(iterations, &flows);
        }
        let moved = flows
            .iter()
            .zip(&before)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);

        drops = evaluate_branches(&flows, &eval, config.parallel_branches)?;
        gap = spread(&drops);
        debug!(iteration = iterations, spread_pa = gap, moved, "parallel resolver step");

        if moved == 0.0 {
            break;
        }
    }

    Ok(BalanceResult {
        converged: gap < config.pressure_tolerance,
        flows,
        drops,
        iterations,
        spread: gap,
        method: NetworkMethod::ParallelResolver,
    })
}

/// Restore `Σq = total`: scale when every branch flows forward, otherwise
/// shift each branch by the same amount.
fn renormalize(flows: &mut [f64], total: f64) {
    let sum: f64 = flows.iter().sum();
    if flows.iter().all(|&q| q > 0.0) && total > 0.0 {
        let k = total / sum;
        flows.iter_mut().for_each(|q| *q *= k);
    } else {
        let shift = (total - sum) / flows.len() as f64;
        flows.iter_mut().for_each(|q| *q += shift);
    }
}
