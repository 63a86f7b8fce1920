//! Network evaluator.
//!
//! Tree networks are evaluated recursively over the arena: series blocks add
//! their parts, parallel blocks are balanced so every branch sees the same
//! drop. Node-and-edge networks are solved on their graph with Hardy-Cross.

use crate::config::{NetworkMethod, SolverConfig};
use crate::error::{SolverError, SolverResult};
use crate::hardy_cross::{hardy_cross, hardy_cross_parallel};
use crate::matrix::matrix_balance;
use crate::parallel::{BalanceResult, resolve_parallel};
use crate::series::{PathDrop, evaluate_series};
use pf_components::physics::{head_from_pressure, pump_power};
use pf_components::{EvalContext, LossOrGain, Upstream, evaluate_element};
use pf_core::units::{Length, Power, Pressure, VolumeRate, m3ps, pa, watts};
use pf_core::{NetId, Warning};
use pf_graph::{
    Connection, Element, LoopTopology, NetworkBlock, PipelineNetwork, SEED_FLOW_M3PS,
    TopologyError, normalize_block,
};
use std::slice;
use tracing::{debug, info, warn};

/// How one balanced block or graph ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceRecord {
    /// Block name, or the network name for graph solves.
    pub block: String,
    pub method: NetworkMethod,
    /// m³/s per branch (or per edge).
    pub flows: Vec<f64>,
    /// Pa per branch (or per edge).
    pub drops: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Branch drop spread, or the largest loop residual, in Pa.
    pub spread: f64,
}

/// Solved pressure and throughput at a named node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    pub name: String,
    pub pressure: Pressure,
    pub flow: VolumeRate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkOutcome {
    pub flow: VolumeRate,
    /// Inlet minus outlet pressure along the network.
    pub total_drop: Pressure,
    pub head_loss: Length,
    pub required_power: Power,
    pub pump_power: Power,
    /// Every leaf at its solved flow, in network order.
    pub elements: Vec<LossOrGain>,
    pub warnings: Vec<Warning>,
    pub balances: Vec<BalanceRecord>,
    /// Empty for tree networks.
    pub nodes: Vec<NodeState>,
    pub method: NetworkMethod,
}

impl NetworkOutcome {
    pub fn converged(&self) -> bool {
        self.balances.iter().all(|b| b.converged)
    }
}

#[derive(Default)]
struct Report {
    elements: Vec<LossOrGain>,
    balances: Vec<BalanceRecord>,
    warnings: Vec<Warning>,
}

#[derive(Clone, Copy)]
struct BlockDrop {
    drop: f64,
    slope: f64,
    upstream: Option<Upstream>,
}

impl BlockDrop {
    fn path(&self) -> PathDrop {
        PathDrop {
            drop: self.drop,
            slope: self.slope,
        }
    }
}

/// Evaluates a [`PipelineNetwork`] at a given total flow.
pub struct NetworkSolver<'a> {
    net: &'a PipelineNetwork,
    ctx: EvalContext<'a>,
    config: SolverConfig,
}

impl<'a> NetworkSolver<'a> {
    pub fn new(
        net: &'a PipelineNetwork,
        ctx: EvalContext<'a>,
        config: SolverConfig,
    ) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self {
            net,
            ctx: config.apply(ctx),
            config,
        })
    }

    pub fn solve(&self, flow: VolumeRate) -> SolverResult<NetworkOutcome> {
        let q = flow.value;
        if !q.is_finite() {
            return Err(SolverError::NumericalError {
                what: format!("network flow {q} is not finite"),
            });
        }

        if self.net.is_edge_network() {
            info!(network = %self.net.name(), "node-and-edge network, solving loops with hardy-cross");
            return self.solve_graph(flow);
        }

        info!(network = %self.net.name(), method = %self.config.method, "solving network");
        let mut report = Report::default();
        let inlet = self.ctx.reference_pressure.map(|p| p.value);
        let root = self.eval_block(self.net.root(), q, None, inlet, Some(&mut report))?;
        self.finish(flow, root.drop, report, Vec::new(), self.config.method)
    }

    fn block(&self, id: NetId) -> SolverResult<&'a NetworkBlock> {
        self.net
            .block(id)
            .ok_or(SolverError::Topology(TopologyError::UnknownNetwork { id }))
    }

    fn exponent(&self) -> f64 {
        self.config.loss_exponent
    }

    /// `inlet` is the running pressure where the block starts, if known.
    fn eval_block(
        &self,
        id: NetId,
        q: f64,
        entry: Option<Upstream>,
        inlet: Option<f64>,
        report: Option<&mut Report>,
    ) -> SolverResult<BlockDrop> {
        let block = self.block(id)?;
        match block.connection {
            Connection::Series if self.net.is_parallel_free(id) => {
                let chain = normalize_block(self.net, id)?
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                self.eval_run(&chain, q, entry, inlet, report)
            }
            Connection::Series => self.eval_series_block(block, q, entry, inlet, report),
            Connection::Parallel => self.eval_parallel_block(block, q, entry, inlet, report),
        }
    }

    /// Contiguous leaves through the series evaluator.
    fn eval_run(
        &self,
        run: &[Element],
        q: f64,
        entry: Option<Upstream>,
        inlet: Option<f64>,
        report: Option<&mut Report>,
    ) -> SolverResult<BlockDrop> {
        if run.is_empty() {
            return Ok(BlockDrop {
                drop: 0.0,
                slope: 0.0,
                upstream: entry,
            });
        }
        let mut ctx = self.ctx.with_upstream(entry);
        ctx.reference_pressure = inlet.map(pa);
        let r = evaluate_series(run, m3ps(q), &ctx)?;
        let out = BlockDrop {
            drop: r.total_drop.value,
            slope: r.slope(self.exponent()),
            upstream: r.upstream,
        };
        if let Some(rep) = report {
            rep.elements.extend(r.elements);
        }
        Ok(out)
    }

    fn eval_series_block(
        &self,
        block: &NetworkBlock,
        q: f64,
        entry: Option<Upstream>,
        inlet: Option<f64>,
        mut report: Option<&mut Report>,
    ) -> SolverResult<BlockDrop> {
        let elements = block.elements();
        let mut total = BlockDrop {
            drop: 0.0,
            slope: 0.0,
            upstream: entry,
        };
        let add = |total: &mut BlockDrop, part: BlockDrop| {
            total.drop += part.drop;
            total.slope += part.slope;
            total.upstream = part.upstream.or(total.upstream);
        };

        let mut start = 0;
        for (i, element) in elements.iter().enumerate() {
            if let Element::Network(child) = element {
                let here = inlet.map(|p| p - total.drop);
                let run = self.eval_run(
                    &elements[start..i],
                    q,
                    total.upstream,
                    here,
                    report.as_deref_mut(),
                )?;
                add(&mut total, run);
                let here = inlet.map(|p| p - total.drop);
                let sub = self.eval_block(*child, q, total.upstream, here, report.as_deref_mut())?;
                add(&mut total, sub);
                start = i + 1;
            }
        }
        let here = inlet.map(|p| p - total.drop);
        let run = self.eval_run(&elements[start..], q, total.upstream, here, report)?;
        add(&mut total, run);
        Ok(total)
    }

    fn eval_branch(
        &self,
        element: &Element,
        q: f64,
        entry: Option<Upstream>,
        inlet: Option<f64>,
        report: Option<&mut Report>,
    ) -> SolverResult<BlockDrop> {
        match element {
            Element::Network(child) => self.eval_block(*child, q, entry, inlet, report),
            leaf => self.eval_run(slice::from_ref(leaf), q, entry, inlet, report),
        }
    }

    fn eval_parallel_block(
        &self,
        block: &NetworkBlock,
        q: f64,
        entry: Option<Upstream>,
        inlet: Option<f64>,
        report: Option<&mut Report>,
    ) -> SolverResult<BlockDrop> {
        let branches = block.elements();
        let eval = |i: usize, qi: f64| -> SolverResult<PathDrop> {
            Ok(self.eval_branch(&branches[i], qi, entry, inlet, None)?.path())
        };
        let result = self.balance(branches.len(), q, &eval)?;
        debug!(
            block = %block.name,
            method = %result.method,
            iterations = result.iterations,
            spread_pa = result.spread,
            "parallel block balanced"
        );

        let lead = result
            .flows
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let upstream = match report {
            Some(rep) => {
                let mut upstream = None;
                for (i, (element, &qi)) in branches.iter().zip(&result.flows).enumerate() {
                    let b = self.eval_branch(element, qi, entry, inlet, Some(&mut *rep))?;
                    if i == lead {
                        upstream = b.upstream;
                    }
                }
                if !result.converged {
                    rep.warnings.push(Warning::convergence(
                        &block.name,
                        format!(
                            "{} stopped after {} iterations with a {:.3} Pa drop spread",
                            result.method, result.iterations, result.spread
                        ),
                    ));
                }
                rep.balances.push(record(&block.name, &result));
                upstream
            }
            None => match branches.get(lead) {
                Some(element) => {
                    self.eval_branch(element, result.flows[lead], entry, inlet, None)?
                        .upstream
                }
                None => None,
            },
        };

        Ok(BlockDrop {
            drop: result.mean_drop(),
            slope: result.combined_slope(),
            upstream: upstream.or(entry),
        })
    }

    fn balance<F>(&self, branches: usize, q: f64, eval: &F) -> SolverResult<BalanceResult>
    where
        F: Fn(usize, f64) -> SolverResult<PathDrop> + Sync,
    {
        let cfg = &self.config;
        match cfg.method {
            NetworkMethod::Auto | NetworkMethod::ParallelResolver => {
                resolve_parallel(q, branches, eval, cfg, None)
            }
            NetworkMethod::Matrix => matrix_balance(q, branches, eval, cfg, None),
            NetworkMethod::HardyCross => hardy_cross_parallel(q, branches, eval, cfg),
            NetworkMethod::Dual => {
                let resolver = resolve_parallel(q, branches, eval, cfg, None)?;
                match matrix_balance(q, branches, eval, cfg, None) {
                    Ok(matrix) if matrix.spread < resolver.spread => Ok(matrix),
                    Ok(_) => Ok(resolver),
                    Err(SolverError::Singular { what }) => {
                        debug!(%what, "matrix balancer singular, keeping resolver split");
                        Ok(resolver)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    fn solve_graph(&self, flow: VolumeRate) -> SolverResult<NetworkOutcome> {
        let q = flow.value;
        let root = self.net.root_block();
        let elements = root.elements();
        let topo = LoopTopology::from_network(self.net)?;
        let injection = topo.terminal_injection(q);

        let share = q / (topo.chords().len() + 1) as f64;
        let seeds: Vec<f64> = topo
            .chords()
            .iter()
            .map(|&c| match &elements[topo.edges[c].element] {
                Element::Pipe(p) if p.flow_rate.value != SEED_FLOW_M3PS => p.flow_rate.value,
                _ => share,
            })
            .collect();
        let initial = topo.initial_flows(&injection, &seeds);

        let edge = |e: usize, qe: f64| -> SolverResult<PathDrop> {
            let element = &elements[topo.edges[e].element];
            Ok(evaluate_series(slice::from_ref(element), m3ps(qe), &self.ctx)?
                .path_drop(self.exponent()))
        };
        let solution = hardy_cross(initial, topo.loops(), edge, &self.config)?;

        let mut by_element: Vec<Vec<LossOrGain>> = vec![Vec::new(); elements.len()];
        let mut drops = Vec::with_capacity(topo.edges.len());
        for (e, graph_edge) in topo.edges.iter().enumerate() {
            let element = &elements[graph_edge.element];
            let r = evaluate_series(slice::from_ref(element), m3ps(solution.flows[e]), &self.ctx)?;
            drops.push(r.total_drop.value);
            by_element[graph_edge.element] = r.elements;
        }

        let inlet_pressure = self.ctx.reference_pressure.map_or(0.0, |p| p.value);
        let pressures = topo.node_pressures(inlet_pressure, &drops);
        let through = topo.node_throughput(&solution.flows, &injection);

        // Fittings at nodes see the node throughput and borrow the busiest
        // incident pipe's diameter and friction factor.
        let mut fitting_loss = 0.0;
        for (i, element) in elements.iter().enumerate() {
            let Element::Fitting(fitting) = element else {
                continue;
            };
            let node = fitting
                .node
                .as_deref()
                .and_then(|n| topo.node_index(n))
                .unwrap_or(topo.inlet);
            let upstream = topo
                .edges
                .iter()
                .enumerate()
                .filter(|(_, ge)| ge.from == node || ge.to == node)
                .filter_map(|(e, ge)| {
                    by_element[ge.element]
                        .first()
                        .and_then(LossOrGain::upstream)
                        .map(|up| (solution.flows[e].abs(), up))
                })
                .max_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, up)| up);
            let r = evaluate_element(element, m3ps(through[node]), &self.ctx.with_upstream(upstream))?;
            fitting_loss += r.pressure_drop().value;
            by_element[i].push(r);
        }

        let total = pressures[topo.inlet] - pressures[topo.outlet] + fitting_loss;
        let nodes = topo
            .nodes
            .iter()
            .enumerate()
            .map(|(k, name)| NodeState {
                name: name.clone(),
                pressure: pa(pressures[k]),
                flow: m3ps(through[k]),
            })
            .collect();

        let mut report = Report {
            elements: by_element.into_iter().flatten().collect(),
            ..Report::default()
        };
        if !solution.converged {
            report.warnings.push(Warning::convergence(
                root.name.as_str(),
                format!(
                    "hardy-cross stopped after {} iterations with correction {:.3e} m3/s and loop residual {:.3} Pa",
                    solution.iterations,
                    solution.max_correction,
                    solution.max_residual()
                ),
            ));
        }
        report.balances.push(BalanceRecord {
            block: root.name.clone(),
            method: NetworkMethod::HardyCross,
            spread: solution.max_residual(),
            flows: solution.flows,
            drops,
            iterations: solution.iterations,
            converged: solution.converged,
        });
        self.finish(flow, total, report, nodes, NetworkMethod::HardyCross)
    }

    fn finish(
        &self,
        flow: VolumeRate,
        total_drop: f64,
        report: Report,
        nodes: Vec<NodeState>,
        method: NetworkMethod,
    ) -> SolverResult<NetworkOutcome> {
        let total = pa(total_drop);
        let mut warnings: Vec<Warning> = report
            .elements
            .iter()
            .flat_map(|e| e.warnings.iter().cloned())
            .collect();
        warnings.extend(report.warnings);
        for w in &warnings {
            warn!(kind = %w.kind, source = %w.source, "{}", w.message);
        }
        let shaft = report
            .elements
            .iter()
            .filter_map(|e| e.shaft_power)
            .fold(watts(0.0), |acc, p| acc + p);

        info!(
            drop_pa = total_drop,
            elements = report.elements.len(),
            warnings = warnings.len(),
            "network solved"
        );
        Ok(NetworkOutcome {
            flow,
            total_drop: total,
            head_loss: head_from_pressure(total, self.ctx.fluid.density)?,
            required_power: pump_power(total, flow, self.ctx.pump_efficiency)?,
            pump_power: shaft,
            elements: report.elements,
            warnings,
            balances: report.balances,
            nodes,
            method,
        })
    }
}

fn record(block: &str, result: &BalanceResult) -> BalanceRecord {
    BalanceRecord {
        block: block.to_string(),
        method: result.method,
        flows: result.flows.clone(),
        drops: result.drops.iter().map(|d| d.drop).collect(),
        iterations: result.iterations,
        converged: result.converged,
        spread: result.spread,
    }
}
