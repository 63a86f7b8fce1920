//! Hardy-Cross loop correction.
//!
//! Flows start from an assignment that already satisfies node continuity.
//! Each pass visits every independent loop and applies
//!
//! ```text
//! ΔQ = -Σ s_e ΔP_e / Σ dΔP_e/dQ
//! ```
//!
//! to all of its edges, `s_e` being the edge's orientation in the loop.
//! Adding the same correction around a closed loop never changes the net
//! flow at any node, so continuity is preserved throughout.

use crate::config::{NetworkMethod, SolverConfig};
use crate::error::{SolverError, SolverResult};
use crate::parallel::BalanceResult;
use crate::series::PathDrop;
use pf_graph::LoopPath;
use tracing::{debug, warn};

/// Converged (or best) edge flows of a looped network.
#[derive(Clone, Debug, PartialEq)]
pub struct LoopSolution {
    /// m³/s per edge, positive along the edge's orientation.
    pub flows: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Largest |ΔQ| of the final pass.
    pub max_correction: f64,
    /// Signed sum of edge drops around each loop at `flows`.
    pub loop_residuals: Vec<f64>,
}

impl LoopSolution {
    pub fn max_residual(&self) -> f64 {
        self.loop_residuals.iter().fold(0.0, |m, r| m.max(r.abs()))
    }
}

/// Balance `initial` edge flows around `loops`.
///
/// `edge(e, q)` gives the drop of edge `e` at flow `q` along its orientation.
pub fn hardy_cross<F>(
    initial: Vec<f64>,
    loops: &[LoopPath],
    edge: F,
    config: &SolverConfig,
) -> SolverResult<LoopSolution>
where
    F: Fn(usize, f64) -> SolverResult<PathDrop>,
{
    let mut flows = initial;
    for path in loops {
        if let Some(&(e, _)) = path.iter().find(|(e, _)| *e >= flows.len()) {
            return Err(SolverError::config(format!(
                "loop references edge {e} of {}",
                flows.len()
            )));
        }
    }

    let mut iterations = 0;
    let mut max_correction = f64::INFINITY;
    // Loops whose drop does not respond to flow cannot be corrected.
    let mut stalled = 0;
    while !loops.is_empty() && iterations < config.hardy_cross_max_iterations {
        iterations += 1;
        max_correction = 0.0;
        stalled = 0;
        for path in loops {
            let mut imbalance = 0.0;
            let mut resistance = 0.0;
            for &(e, sign) in path {
                let d = edge(e, flows[e])?;
                imbalance += sign * d.drop;
                resistance += edge_slope(&edge, e, flows[e], d, config)?;
            }
            if resistance <= 0.0 {
                if f64::abs(imbalance) > config.pressure_tolerance {
                    stalled += 1;
                }
                continue;
            }
            let dq = -imbalance / resistance;
            for &(e, sign) in path {
                flows[e] += sign * dq;
            }
            max_correction = max_correction.max(dq.abs());
        }
        debug!(iteration = iterations, max_correction, stalled, "hardy-cross pass");
        if max_correction < config.flow_tolerance {
            break;
        }
    }
    if loops.is_empty() {
        max_correction = 0.0;
    }
    if stalled > 0 {
        warn!(stalled, "hardy-cross loops have flow-independent imbalance");
    }

    let loop_residuals = loops
        .iter()
        .map(|path| {
            path.iter().try_fold(0.0, |acc, &(e, sign)| {
                Ok::<_, SolverError>(acc + sign * edge(e, flows[e])?.drop)
            })
        })
        .collect::<SolverResult<Vec<_>>>()?;

    Ok(LoopSolution {
        converged: stalled == 0 && max_correction < config.flow_tolerance,
        flows,
        iterations,
        max_correction,
        loop_residuals,
    })
}

/// `dΔP/dQ` of one edge. Falls back to a finite difference where the
/// analytic estimate vanishes (no flow, or flow-independent elements).
fn edge_slope<F>(edge: &F, e: usize, q: f64, at: PathDrop, config: &SolverConfig) -> SolverResult<f64>
where
    F: Fn(usize, f64) -> SolverResult<PathDrop>,
{
    if at.slope > 0.0 {
        return Ok(at.slope);
    }
    let h = (q.abs() * 1e-4).max(config.flow_tolerance);
    let ahead = edge(e, q + h)?;
    Ok(((ahead.drop - at.drop) / h).max(0.0))
}

/// Parallel branches as a loop network: branch 0 against each other branch.
pub fn hardy_cross_parallel<F>(
    total: f64,
    branches: usize,
    eval: F,
    config: &SolverConfig,
) -> SolverResult<BalanceResult>
where
    F: Fn(usize, f64) -> SolverResult<PathDrop>,
{
    if branches == 0 {
        return Err(SolverError::config("parallel block has no branches"));
    }
    let loops: Vec<LoopPath> = (1..branches).map(|i| vec![(0, 1.0), (i, -1.0)]).collect();
    let solution = hardy_cross(vec![total / branches as f64; branches], &loops, &eval, config)?;
    let drops = solution
        .flows
        .iter()
        .enumerate()
        .map(|(i, &q)| eval(i, q))
        .collect::<SolverResult<Vec<_>>>()?;
    let spread = crate::parallel::spread(&drops);
    Ok(BalanceResult {
        converged: solution.converged,
        flows: solution.flows,
        drops,
        iterations: solution.iterations,
        spread,
        method: NetworkMethod::HardyCross,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_graph::{GraphEdge, LoopTopology};
    use proptest::prelude::*;

    fn quadratic(r: Vec<f64>) -> impl Fn(usize, f64) -> SolverResult<PathDrop> {
        move |e, q| {
            Ok(PathDrop {
                drop: r[e] * q * q.abs(),
                slope: 2.0 * r[e] * q.abs(),
            })
        }
    }

    /// Square with a diagonal, fed at node 0 and drained at node 3.
    fn square() -> LoopTopology {
        let edges = [(0, 1), (1, 3), (0, 2), (2, 3), (1, 2)]
            .iter()
            .enumerate()
            .map(|(i, &(from, to))| GraphEdge { element: i, from, to })
            .collect();
        let names = (0..4).map(|i| format!("N{i}")).collect();
        LoopTopology::build(names, edges, 0, 3).unwrap()
    }

    #[test]
    fn two_pipe_loop_matches_closed_form() {
        let cfg = SolverConfig {
            flow_tolerance: 1e-10,
            ..SolverConfig::default()
        };
        let out = hardy_cross_parallel(0.3, 2, quadratic(vec![1e6, 4e6]), &cfg).unwrap();
        assert!(out.converged);
        assert!((out.flows[0] - 0.2).abs() < 1e-8);
        assert!((out.flows[1] - 0.1).abs() < 1e-8);
        assert_eq!(out.method, NetworkMethod::HardyCross);
    }

    #[test]
    fn looped_square_closes_and_conserves() {
        let topo = square();
        let injection = topo.terminal_injection(0.5);
        let seeds = vec![0.01; topo.chords().len()];
        let q0 = topo.initial_flows(&injection, &seeds);
        let r = vec![2e5, 3e5, 4e5, 1e5, 6e5];
        let cfg = SolverConfig {
            flow_tolerance: 1e-9,
            ..SolverConfig::default()
        };
        let out = hardy_cross(q0, topo.loops(), quadratic(r), &cfg).unwrap();
        assert!(out.converged);
        assert!(out.max_residual() < 1.0, "{:?}", out.loop_residuals);
        for c in topo.continuity_residual(&out.flows, &injection) {
            assert!(c.abs() < 1e-12);
        }
    }

    #[test]
    fn tree_needs_no_iterations() {
        let out = hardy_cross(vec![0.1, 0.1], &[], quadratic(vec![1.0, 1.0]), &SolverConfig::default())
            .unwrap();
        assert_eq!(out.iterations, 0);
        assert!(out.converged);
    }

    #[test]
    fn zero_flow_loop_uses_numeric_slope() {
        // Both edges start dry; the static offset still drives a correction.
        let eval = |e: usize, q: f64| -> SolverResult<PathDrop> {
            let offset = if e == 0 { 500.0 } else { 0.0 };
            Ok(PathDrop {
                drop: 1e6 * q * q.abs() + offset,
                slope: 2e6 * q.abs(),
            })
        };
        let loops = vec![vec![(0, 1.0), (1, -1.0)]];
        let out = hardy_cross(vec![0.0, 0.0], &loops, eval, &SolverConfig::default()).unwrap();
        assert!(out.flows[0] < 0.0);
        assert!(out.max_residual() < 1.0);
    }

    #[test]
    fn fixed_drop_loop_is_not_converged() {
        // Neither edge responds to flow, so the 10 kPa imbalance cannot close.
        let fixed = |e: usize, _q: f64| -> SolverResult<PathDrop> {
            Ok(PathDrop {
                drop: [1e4, 2e4][e],
                slope: 0.0,
            })
        };
        let loops = vec![vec![(0, 1.0), (1, -1.0)]];
        let out = hardy_cross(vec![0.01, 0.01], &loops, fixed, &SolverConfig::default()).unwrap();
        assert!(!out.converged);
        assert!((out.max_residual() - 1e4).abs() < 1e-9);
        assert_eq!(out.flows, vec![0.01, 0.01]);

        let bank = hardy_cross_parallel(0.02, 2, fixed, &SolverConfig::default()).unwrap();
        assert!(!bank.converged);
    }

    #[test]
    fn balanced_fixed_drop_loop_is_converged() {
        let fixed = |_e: usize, _q: f64| -> SolverResult<PathDrop> {
            Ok(PathDrop { drop: 5e3, slope: 0.0 })
        };
        let loops = vec![vec![(0, 1.0), (1, -1.0)]];
        let out = hardy_cross(vec![0.01, 0.01], &loops, fixed, &SolverConfig::default()).unwrap();
        assert!(out.converged);
    }

    #[test]
    fn bad_edge_index_rejected() {
        let loops = vec![vec![(0, 1.0), (7, -1.0)]];
        let err = hardy_cross(vec![0.0; 2], &loops, quadratic(vec![1.0; 2]), &SolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig { .. }));
    }

    proptest! {
        #[test]
        fn loops_close_at_terminal_state(
            r in prop::collection::vec(1.0e4f64..1.0e6, 5),
            total in 0.01f64..1.0,
        ) {
            let topo = square();
            let injection = topo.terminal_injection(total);
            let q0 = topo.initial_flows(&injection, &vec![0.0; topo.chords().len()]);
            let cfg = SolverConfig { flow_tolerance: 1e-9, ..SolverConfig::default() };
            let out = hardy_cross(q0, topo.loops(), quadratic(r), &cfg).unwrap();
            prop_assert!(out.converged);
            // One pressure unit of closure per loop.
            prop_assert!(out.max_residual() < 1.0, "{:?}", out.loop_residuals);
        }
    }
}
