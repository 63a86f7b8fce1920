//! The pipeline engine: bind a configuration, run it, keep the last result.

use crate::config::{EngineConfig, FlowSpec, FluidSpec, Topology};
use crate::error::{AppError, AppResult};
use crate::report::{balance_report, element_report, node_report, sizing_report};
use pf_components::EvalContext;
use pf_components::LossOrGain;
use pf_components::physics::{flow_from_velocity, volumetric_flow};
use pf_core::units::{Length, Power, Pressure, VolumeRate, m};
use pf_core::{Warning, WarningKind};
use pf_fluids::{CoolPropFluid, FluidCategory, FluidProperties, FluidState};
use pf_graph::{
    Element, ElementKind, Node, Pipe, PipelineNetwork, TopologyError, check_fittings,
};
use pf_graph::elements::DEFAULT_MATERIAL;
use pf_results::{PipelineResults, ResultsStore, ResultsSummary, RunMode, compute_run_id};
use pf_solver::{
    BalanceRecord, NetworkSolver, NodeState, SizingOutcome, SizingTarget, SolverConfig,
    evaluate_series, size_chain, size_network,
};
use pf_standards::{PipeCostModel, StandardTables, StandardsProvider};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Version stamped on results and folded into run ids.
pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fitted configuration with the fluid and flow already resolved.
#[derive(Debug, Clone)]
struct Bound {
    config: EngineConfig,
    topology: Topology,
    fluid: FluidState,
    category: FluidCategory,
    flow: VolumeRate,
    mode: RunMode,
    run_id: String,
}

impl Bound {
    fn context<'a>(&self, standards: &'a dyn StandardsProvider) -> EvalContext<'a> {
        let mut ctx = EvalContext::new(self.fluid, standards);
        ctx.category = self.category;
        ctx.reference_pressure = self.config.reference_pressure;
        self.config.solver.apply(ctx)
    }

    fn sizing_target(&self) -> SizingTarget {
        match self.config.available_dp {
            Some(dp) => SizingTarget::PressureBudget(dp),
            None if self.config.economic => SizingTarget::Economic,
            None => SizingTarget::Velocity,
        }
    }
}

/// Inputs a run id is derived from.
#[derive(Serialize)]
struct RunInputs<'a> {
    density_kg_m3: f64,
    viscosity_pa_s: f64,
    category: &'static str,
    flow_m3_s: f64,
    topology: &'a Topology,
    available_dp_pa: Option<f64>,
    economic: bool,
    reference_pressure_pa: Option<f64>,
    solver: &'a SolverConfig,
    standards: TableDigest,
    cost_model: &'a PipeCostModel,
}

/// Standards data a topology reads, as looked up through the provider.
#[derive(Serialize)]
struct TableDigest {
    diameters_m: Vec<f64>,
    velocity_band_m_s: (f64, f64),
    roughness_m: BTreeMap<String, f64>,
    /// `(K, L/D)` per fitting type.
    fittings: BTreeMap<String, (Option<f64>, Option<f64>)>,
    /// Internal diameter per `nominal_m/schedule` entry.
    schedules: BTreeMap<String, Option<f64>>,
    /// Nominal size per internal diameter, for pricing.
    nominals: BTreeMap<String, Option<f64>>,
}

impl TableDigest {
    fn new(standards: &dyn StandardsProvider, category: FluidCategory, topology: &Topology) -> Self {
        let mut materials = BTreeSet::from([DEFAULT_MATERIAL.to_string()]);
        let mut fitting_types = BTreeSet::new();
        let mut schedules = BTreeMap::new();
        let mut nominals = BTreeMap::new();
        let mut visit_pipe = |pipe: &Pipe| {
            materials.insert(pipe.material.clone());
            fitting_types.extend(pipe.fittings.iter().map(|f| f.fitting_type.clone()));
            if let Some(nominal) = pipe.nominal_diameter {
                let schedule = pipe.schedule.as_deref();
                let key = format!("{}/{}", nominal.value, schedule.unwrap_or("-"));
                let id = standards.internal_diameter(nominal, schedule).map(|d| d.value);
                schedules.insert(key, id);
            }
            if let Some(d) = pipe.internal_diameter {
                let nominal = standards.nominal_for_internal(d).map(|n| n.value);
                nominals.insert(d.value.to_string(), nominal);
            }
        };
        let mut leaves: Vec<&Element> = Vec::new();
        match topology {
            Topology::Pipe(pipe) => visit_pipe(pipe),
            Topology::Chain(elements) => leaves.extend(elements),
            Topology::Network(net) => {
                for block in net.attached_blocks() {
                    leaves.extend(block.elements());
                }
            }
        }
        let mut leaf_fitting_types = Vec::new();
        for leaf in leaves {
            match leaf {
                Element::Pipe(pipe) => visit_pipe(pipe),
                Element::Fitting(f) => {
                    leaf_fitting_types.push(f.fitting_type.clone());
                }
                _ => {}
            }
        }
        fitting_types.extend(leaf_fitting_types);

        let (lo, hi) = standards.recommended_velocity(category);
        Self {
            diameters_m: standards.standard_diameters().iter().map(|d| d.value).collect(),
            velocity_band_m_s: (lo.value, hi.value),
            roughness_m: materials
                .into_iter()
                .map(|mat| {
                    let eps = standards.roughness(&mat).value;
                    (mat, eps)
                })
                .collect(),
            fittings: fitting_types
                .into_iter()
                .map(|t| {
                    let k = standards.k_factor(&t, None);
                    let l_over_d = standards.equivalent_length(&t, Some(m(1.0))).map(|l| l.value);
                    (t, (k, l_over_d))
                })
                .collect(),
            schedules,
            nominals,
        }
    }
}

/// What one evaluation produced, before it is flattened into results.
struct Evaluation {
    total_drop: Pressure,
    head_loss: Length,
    required_power: Power,
    pump_power: Power,
    elements: Vec<LossOrGain>,
    nodes: Vec<NodeState>,
    balances: Vec<BalanceRecord>,
    warnings: Vec<Warning>,
    sizing: Vec<SizingOutcome>,
    /// Pipes as evaluated, diameters filled in.
    pipes: Vec<Pipe>,
    /// The solved working copy, for network runs.
    network: Option<PipelineNetwork>,
}

/// Pressure-drop engine for single pipes, chains and networks.
///
/// `fit` validates and binds a configuration; `run` evaluates a working copy
/// of it, so the bound topology is never modified and repeated runs agree.
pub struct PipelineEngine {
    standards: Box<dyn StandardsProvider>,
    cost_model: PipeCostModel,
    bound: Option<Bound>,
    last: Option<PipelineResults>,
    solved: Option<PipelineNetwork>,
}

impl Default for PipelineEngine {
    fn default() -> Self {
        Self::new(StandardTables::default())
    }
}

impl PipelineEngine {
    pub fn new(standards: impl StandardsProvider + 'static) -> Self {
        Self {
            standards: Box::new(standards),
            cost_model: PipeCostModel::default_steel(),
            bound: None,
            last: None,
            solved: None,
        }
    }

    pub fn with_cost_model(mut self, model: PipeCostModel) -> Self {
        self.cost_model = model;
        self
    }

    /// Validate `config` and bind it for the next [`run`](Self::run).
    ///
    /// Fails on a missing flow or topology, non-physical fluid data, bad
    /// geometry, topology errors and invalid solver settings. The previously
    /// bound configuration is kept when fitting fails.
    pub fn fit(&mut self, mut config: EngineConfig) -> AppResult<&mut Self> {
        let topology = config.topology.take().ok_or_else(|| AppError::MissingInput {
            what: "pipe, chain or network".to_string(),
        })?;
        config.solver.validate()?;
        if let Some(dp) = config.available_dp {
            if !(dp.value.is_finite() && dp.value > 0.0) {
                return Err(AppError::InvalidInput(format!(
                    "available pressure drop must be positive, got {} Pa",
                    dp.value
                )));
            }
        }

        let fluid = resolve_fluid(&config.fluid)?;
        let category = config.category.unwrap_or(match config.fluid {
            FluidSpec::Library { species, .. } => species.default_category(),
            _ => FluidCategory::default(),
        });
        let flow = infer_flow(config.flow.as_ref(), &topology, &fluid)?;
        self.check_topology(&topology)?;

        let mode = match topology {
            Topology::Pipe(_) => RunMode::SinglePipe,
            Topology::Chain(_) => RunMode::Chain,
            Topology::Network(_) => RunMode::Network,
        };
        let inputs = RunInputs {
            density_kg_m3: fluid.density.value,
            viscosity_pa_s: fluid.viscosity.value,
            category: category.key(),
            flow_m3_s: flow.value,
            topology: &topology,
            available_dp_pa: config.available_dp.map(|p| p.value),
            economic: config.economic,
            reference_pressure_pa: config.reference_pressure.map(|p| p.value),
            solver: &config.solver,
            standards: TableDigest::new(self.standards.as_ref(), category, &topology),
            cost_model: &self.cost_model,
        };
        let run_id = compute_run_id(&inputs, mode, SOLVER_VERSION)?;
        if let Topology::Network(net) = &topology {
            debug!(outline = %net.describe(), "network bound");
        }

        info!(
            %mode,
            flow_m3_s = flow.value,
            density_kg_m3 = fluid.density.value,
            category = category.key(),
            "engine fitted"
        );
        self.bound = Some(Bound {
            config,
            topology,
            fluid,
            category,
            flow,
            mode,
            run_id,
        });
        Ok(self)
    }

    /// Run id the next [`run`](Self::run) will carry.
    pub fn pending_run_id(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.run_id.as_str())
    }

    /// Resolved design flow of the bound configuration.
    pub fn flow(&self) -> Option<VolumeRate> {
        self.bound.as_ref().map(|b| b.flow)
    }

    /// Evaluate the bound configuration.
    ///
    /// Unsized pipes are sized first (pressure budget, economic rule or
    /// velocity band, in that order of preference), unless the solver
    /// config carries a default diameter.
    pub fn run(&mut self) -> AppResult<PipelineResults> {
        let (results, network) = self.execute()?;
        self.solved = network;
        self.last = Some(results.clone());
        Ok(results)
    }

    /// Run and persist the results in `store`.
    pub fn run_and_store(&mut self, store: &ResultsStore) -> AppResult<PipelineResults> {
        let results = self.run()?;
        let path = store.save(&results)?;
        info!(run_id = %results.run_id, path = %path.display(), "results stored");
        Ok(results)
    }

    /// Aggregate view of the last run.
    pub fn summary(&self) -> Option<ResultsSummary> {
        self.last.as_ref().map(|r| r.summary().clone())
    }

    pub fn last_results(&self) -> Option<&PipelineResults> {
        self.last.as_ref()
    }

    /// Working copy of the last network run: sized pipes, and node pressures
    /// and throughputs for node-and-edge networks. `None` for pipe and chain
    /// runs.
    pub fn solved_network(&self) -> Option<&PipelineNetwork> {
        self.solved.as_ref()
    }

    /// A node of the last solved network, with its diagnostics.
    pub fn solved_node(&self, name: &str) -> Option<&Node> {
        self.solved.as_ref()?.find_node_anywhere(name)
    }

    fn execute(&self) -> AppResult<(PipelineResults, Option<PipelineNetwork>)> {
        let bound = self.bound.as_ref().ok_or(AppError::NotFitted)?;
        let ctx = bound.context(self.standards.as_ref());
        let target = bound.sizing_target();
        let size = ctx.default_diameter.is_none();

        let mut eval = match &bound.topology {
            Topology::Pipe(pipe) => {
                self.evaluate_chain(vec![Element::Pipe(pipe.clone())], bound, &ctx, target, size)?
            }
            Topology::Chain(elements) => {
                self.evaluate_chain(elements.clone(), bound, &ctx, target, size)?
            }
            Topology::Network(net) => {
                let mut net = net.clone();
                net.resolve_elevations();
                let sizing = if size {
                    size_network(&mut net, bound.flow, target, &ctx)?
                } else {
                    Vec::new()
                };
                let outcome = NetworkSolver::new(&net, ctx, bound.config.solver)?.solve(bound.flow)?;
                for node in &outcome.nodes {
                    net.annotate_node(&node.name, Some(node.pressure), Some(node.flow));
                }
                Evaluation {
                    total_drop: outcome.total_drop,
                    head_loss: outcome.head_loss,
                    required_power: outcome.required_power,
                    pump_power: outcome.pump_power,
                    elements: outcome.elements,
                    nodes: outcome.nodes,
                    balances: outcome.balances,
                    warnings: outcome.warnings,
                    sizing,
                    pipes: net.all_pipes().into_iter().cloned().collect(),
                    network: Some(net),
                }
            }
        };

        let network = eval.network.take();
        let results = self.collect(bound, &ctx, eval)?;
        info!(
            run_id = %results.run_id,
            mode = %results.summary.mode,
            drop_pa = results.summary.pressure_drop_pa,
            warnings = results.warnings.len(),
            "run complete"
        );
        Ok((results, network))
    }

    fn evaluate_chain(
        &self,
        mut elements: Vec<Element>,
        bound: &Bound,
        ctx: &EvalContext<'_>,
        target: SizingTarget,
        size: bool,
    ) -> AppResult<Evaluation> {
        let sizing = if size {
            size_chain(&mut elements, bound.flow, target, ctx)?
        } else {
            Vec::new()
        };
        let series = evaluate_series(&elements, bound.flow, ctx)?;
        for w in &series.warnings {
            warn!(kind = %w.kind, source = %w.source, "{}", w.message);
        }
        let pipes = elements
            .into_iter()
            .filter_map(|e| match e {
                Element::Pipe(p) => Some(p),
                _ => None,
            })
            .collect();
        Ok(Evaluation {
            total_drop: series.total_drop,
            head_loss: series.head_loss,
            required_power: series.required_power,
            pump_power: series.pump_power,
            elements: series.elements,
            nodes: Vec::new(),
            balances: Vec::new(),
            warnings: series.warnings,
            sizing,
            pipes,
            network: None,
        })
    }

    fn collect(
        &self,
        bound: &Bound,
        ctx: &EvalContext<'_>,
        eval: Evaluation,
    ) -> AppResult<PipelineResults> {
        // Selection warnings only; the sized pipe's advisories are already
        // on its element record.
        let mut warnings: Vec<Warning> = eval
            .sizing
            .iter()
            .flat_map(|s| s.warnings.iter())
            .filter(|w| w.kind == WarningKind::BudgetExceeded)
            .cloned()
            .collect();
        warnings.extend(eval.warnings);

        let lead = eval
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Pipe)
            .max_by(|a, b| speed(a).total_cmp(&speed(b)));
        let converged = eval.balances.iter().all(|b| b.converged)
            && !warnings.iter().any(|w| w.kind == WarningKind::Convergence);

        let summary = ResultsSummary {
            mode: bound.mode,
            flow_m3_s: bound.flow.value,
            pressure_drop_pa: eval.total_drop.value,
            head_loss_m: eval.head_loss.value,
            required_power_w: eval.required_power.value,
            pump_power_w: eval.pump_power.value,
            velocity_m_s: lead.and_then(|e| e.velocity).map(|v| v.value),
            reynolds: lead.and_then(|e| e.reynolds),
            friction_factor: lead.and_then(|e| e.friction_factor),
            pipe_cost: self.pipe_cost(&eval.pipes, ctx.default_length),
            converged,
            warning_count: warnings.len(),
        };

        Ok(PipelineResults {
            run_id: bound.run_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: SOLVER_VERSION.to_string(),
            summary,
            elements: eval.elements.iter().map(element_report).collect(),
            nodes: eval.nodes.iter().map(node_report).collect(),
            balances: eval.balances.iter().map(balance_report).collect(),
            sizing: eval.sizing.iter().map(sizing_report).collect(),
            warnings,
        })
    }

    /// Cost of every pipe with a known nominal size. `None` when nothing is priced.
    fn pipe_cost(&self, pipes: &[Pipe], default_length: Length) -> Option<f64> {
        let priced: Vec<(&str, Length, Length)> = pipes
            .iter()
            .filter_map(|p| {
                let nominal = p.nominal_diameter.or_else(|| {
                    p.internal_diameter
                        .and_then(|d| self.standards.nominal_for_internal(d))
                })?;
                Some((p.material.as_str(), nominal, p.length.unwrap_or(default_length)))
            })
            .collect();
        let cost = self.cost_model.total_cost(priced);
        (cost > 0.0).then_some(cost)
    }

    fn check_topology(&self, topology: &Topology) -> AppResult<()> {
        let standards = self.standards.as_ref();
        let known = |fitting_type: &str| {
            standards.k_factor(fitting_type, None).is_some()
                || standards
                    .equivalent_length(fitting_type, Some(m(1.0)))
                    .is_some()
        };
        match topology {
            Topology::Pipe(pipe) => check_leaf(&Element::Pipe(pipe.clone()), &known),
            Topology::Chain(elements) => {
                if elements.is_empty() {
                    return Err(AppError::MissingInput {
                        what: "chain elements".to_string(),
                    });
                }
                elements.iter().try_for_each(|e| check_leaf(e, &known))
            }
            Topology::Network(net) => {
                check_fittings(net, known)?;
                net.all_pipes().into_iter().try_for_each(check_pipe)
            }
        }
    }
}

fn speed(e: &LossOrGain) -> f64 {
    e.velocity.map(|v| v.value.abs()).unwrap_or(0.0)
}

fn resolve_fluid(fluid: &FluidSpec) -> AppResult<FluidState> {
    let state = match *fluid {
        FluidSpec::Constant { density, viscosity } => FluidState::new(density, viscosity)?,
        FluidSpec::Kinematic {
            density,
            kinematic_viscosity,
        } => FluidState::from_kinematic(density, kinematic_viscosity)?,
        FluidSpec::Library {
            species,
            temperature,
            pressure,
        } => CoolPropFluid::new(species).state(temperature, pressure)?,
    };
    Ok(state)
}

fn infer_flow(
    flow: Option<&FlowSpec>,
    topology: &Topology,
    fluid: &FluidState,
) -> AppResult<VolumeRate> {
    let q = match flow {
        None => {
            return Err(AppError::MissingInput {
                what: "flow rate".to_string(),
            });
        }
        Some(FlowSpec::Volumetric(q)) => *q,
        Some(FlowSpec::Mass(w)) => volumetric_flow(*w, fluid.density)?,
        Some(FlowSpec::VelocityDiameter { velocity, diameter }) => {
            let d = diameter
                .or(match topology {
                    Topology::Pipe(p) => p.internal_diameter,
                    _ => None,
                })
                .ok_or_else(|| AppError::MissingInput {
                    what: "diameter for a velocity-based flow".to_string(),
                })?;
            flow_from_velocity(*velocity, d)?
        }
    };
    if !q.value.is_finite() {
        return Err(AppError::InvalidInput(format!("flow rate {} is not finite", q.value)));
    }
    Ok(q)
}

fn check_pipe(pipe: &Pipe) -> AppResult<()> {
    let dims = [
        ("length", pipe.length),
        ("internal diameter", pipe.internal_diameter),
        ("nominal diameter", pipe.nominal_diameter),
    ];
    for (what, value) in dims {
        if let Some(v) = value {
            if !(v.value.is_finite() && v.value > 0.0) {
                return Err(AppError::InvalidGeometry {
                    what: format!("{}: {what}", pipe.name),
                    value: v.value,
                });
            }
        }
    }
    match pipe.roughness {
        Some(r) if !(r.value.is_finite() && r.value >= 0.0) => Err(AppError::InvalidGeometry {
            what: format!("{}: roughness", pipe.name),
            value: r.value,
        }),
        _ => Ok(()),
    }
}

fn check_leaf(element: &Element, known: &impl Fn(&str) -> bool) -> AppResult<()> {
    let fitting_ok = |f: &pf_graph::Fitting| {
        if f.has_explicit_data() || known(&f.fitting_type) {
            Ok(())
        } else {
            Err(AppError::Topology(TopologyError::MissingFittingData {
                fitting: f.name.clone(),
            }))
        }
    };
    match element {
        Element::Pipe(p) => {
            check_pipe(p)?;
            p.fittings.iter().try_for_each(fitting_ok)
        }
        Element::Fitting(f) => fitting_ok(f),
        Element::Pump(p) if !p.has_duty() => Err(TopologyError::MissingPumpData {
            pump: p.name.clone(),
        }
        .into()),
        Element::Equipment(e) if e.loss.is_none() => Err(TopologyError::MissingEquipmentData {
            equipment: e.name.clone(),
        }
        .into()),
        Element::Pump(_) | Element::Equipment(_) => Ok(()),
        Element::Network(_) => Err(AppError::Unsupported {
            message: "nested networks belong in a network topology, not a chain".to_string(),
        }),
    }
}
