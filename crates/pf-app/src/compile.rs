//! Project system definitions compiled into engine configurations.

use crate::config::{EngineConfig, FlowSpec, FluidSpec, Topology};
use crate::error::{AppError, AppResult};
use pf_core::NetId;
use pf_core::units::{k, kgpm3, kgps, m, m2ps, m3ps, mps, pa, pas};
use pf_fluids::{FluidCategory, Species};
use pf_graph::{
    Connection, Element, Equipment, EquipmentLoss, Fitting, NetworkBuilder, Node, Pipe,
    PipelineNetwork, Pump,
};
use pf_project::schema::{
    ConnectionDef, ElementDef, EquipmentDef, FittingDef, FlowDef, FluidDef, MethodDef, NetworkDef,
    PipeDef, PumpDef, SolverDef, SystemDef, TopologyDef,
};
use pf_solver::{NetworkMethod, SolverConfig};

/// Validate `system` and turn it into an [`EngineConfig`].
pub fn compile_system(system: &SystemDef) -> AppResult<EngineConfig> {
    pf_project::validate_system(system)?;

    let mut config = EngineConfig::new(compile_fluid(&system.fluid)?)
        .with_flow(compile_flow(&system.flow))
        .with_solver(compile_solver(&system.solver));
    config.topology = Some(compile_topology(&system.topology)?);
    config.category = system
        .category
        .as_deref()
        .map(|c| {
            c.parse::<FluidCategory>()
                .map_err(|_| AppError::InvalidInput(format!("unknown fluid category '{c}'")))
        })
        .transpose()?;
    config.available_dp = system.sizing.available_dp_pa.map(pa);
    config.economic = system.sizing.economic;
    config.reference_pressure = system.reference_pressure_pa.map(pa);
    Ok(config)
}

pub fn compile_fluid(def: &FluidDef) -> AppResult<FluidSpec> {
    Ok(match def {
        FluidDef::Constant {
            density_kg_m3,
            viscosity_pa_s,
        } => FluidSpec::Constant {
            density: kgpm3(*density_kg_m3),
            viscosity: pas(*viscosity_pa_s),
        },
        FluidDef::Kinematic {
            density_kg_m3,
            kinematic_viscosity_m2_s,
        } => FluidSpec::Kinematic {
            density: kgpm3(*density_kg_m3),
            kinematic_viscosity: m2ps(*kinematic_viscosity_m2_s),
        },
        FluidDef::Library {
            species,
            temperature_k,
            pressure_pa,
        } => FluidSpec::Library {
            species: species
                .parse::<Species>()
                .map_err(|_| AppError::InvalidInput(format!("unknown species '{species}'")))?,
            temperature: k(*temperature_k),
            pressure: pa(*pressure_pa),
        },
    })
}

fn compile_flow(def: &FlowDef) -> FlowSpec {
    match *def {
        FlowDef::Volumetric { flow_m3_s } => FlowSpec::Volumetric(m3ps(flow_m3_s)),
        FlowDef::Mass { mass_flow_kg_s } => FlowSpec::Mass(kgps(mass_flow_kg_s)),
        FlowDef::VelocityDiameter {
            velocity_m_s,
            diameter_m,
        } => FlowSpec::VelocityDiameter {
            velocity: mps(velocity_m_s),
            diameter: Some(m(diameter_m)),
        },
    }
}

/// Project overrides on top of the engine defaults.
pub fn compile_solver(def: &SolverDef) -> SolverConfig {
    let mut cfg = SolverConfig::default().with_method(match def.method {
        MethodDef::Auto => NetworkMethod::Auto,
        MethodDef::ParallelResolver => NetworkMethod::ParallelResolver,
        MethodDef::HardyCross => NetworkMethod::HardyCross,
        MethodDef::Matrix => NetworkMethod::Matrix,
        MethodDef::Dual => NetworkMethod::Dual,
    });
    if let Some(n) = def.max_iterations {
        cfg.max_iterations = n;
    }
    if let Some(n) = def.hardy_cross_max_iterations {
        cfg.hardy_cross_max_iterations = n;
    }
    if let Some(tol) = def.flow_tolerance_m3_s {
        cfg.flow_tolerance = tol;
    }
    if let Some(tol) = def.pressure_tolerance_pa {
        cfg.pressure_tolerance = tol;
    }
    if let Some(eta) = def.pump_efficiency {
        cfg.pump_efficiency = eta;
    }
    if let Some(l) = def.default_length_m {
        cfg.default_length = m(l);
    }
    cfg.default_diameter = def.default_diameter_m.map(m);
    cfg.parallel_branches = def.parallel_branches;
    cfg
}

fn compile_topology(def: &TopologyDef) -> AppResult<Topology> {
    match def {
        TopologyDef::Pipe(p) => Ok(Topology::Pipe(compile_pipe(p))),
        TopologyDef::Chain { elements } => elements
            .iter()
            .map(compile_leaf)
            .collect::<AppResult<Vec<_>>>()
            .map(Topology::Chain),
        TopologyDef::Network(n) => Ok(Topology::Network(compile_network(n)?)),
    }
}

pub fn compile_network(def: &NetworkDef) -> AppResult<PipelineNetwork> {
    let mut builder = NetworkBuilder::new(&def.name, connection(def.connection));
    let root = builder.root();
    fill_block(&mut builder, root, def)?;
    if let (Some(inlet), Some(outlet)) = (&def.inlet, &def.outlet) {
        builder.set_terminals(inlet, outlet);
    }
    Ok(builder.build()?)
}

fn fill_block(builder: &mut NetworkBuilder, id: NetId, def: &NetworkDef) -> AppResult<()> {
    for node in &def.nodes {
        builder.add_node(id, Node::new(&node.name).with_elevation(m(node.elevation_m)))?;
    }
    for element in &def.elements {
        match element {
            ElementDef::Network(child) => {
                let child_id = match child.connection {
                    ConnectionDef::Series => builder.add_series(id, &child.name)?,
                    ConnectionDef::Parallel => builder.add_parallel(id, &child.name)?,
                };
                fill_block(builder, child_id, child)?;
            }
            ElementDef::Fitting(f @ FittingDef { node: Some(node), .. }) => {
                builder.add_fitting(id, compile_fitting(f), node)?;
            }
            leaf => match leaf.endpoints() {
                (Some(from), Some(to)) => builder.add_edge(id, compile_leaf(leaf)?, from, to)?,
                _ => builder.add_element(id, compile_leaf(leaf)?)?,
            },
        }
    }
    Ok(())
}

fn connection(def: ConnectionDef) -> Connection {
    match def {
        ConnectionDef::Series => Connection::Series,
        ConnectionDef::Parallel => Connection::Parallel,
    }
}

/// Leaf element without its endpoints; the builder attaches those.
fn compile_leaf(def: &ElementDef) -> AppResult<Element> {
    Ok(match def {
        ElementDef::Pipe(p) => compile_pipe(p).into(),
        ElementDef::Fitting(f) => compile_fitting(f).into(),
        ElementDef::Pump(p) => compile_pump(p).into(),
        ElementDef::Equipment(e) => compile_equipment(e).into(),
        ElementDef::Network(n) => {
            return Err(AppError::Unsupported {
                message: format!("network '{}' inside a chain; use a network topology", n.name),
            });
        }
    })
}

fn compile_pipe(def: &PipeDef) -> Pipe {
    let mut pipe = Pipe::new(&def.name);
    pipe.length = def.length_m.map(m);
    pipe.nominal_diameter = def.nominal_diameter_m.map(m);
    pipe.internal_diameter = def.internal_diameter_m.map(m);
    if let Some(material) = &def.material {
        pipe.material = material.clone();
    }
    pipe.schedule = def.schedule.clone();
    pipe.roughness = def.roughness_m.map(m);
    pipe.elevation_change = def.elevation_change_m.map(m);
    pipe.fittings = def.fittings.iter().map(compile_fitting).collect();
    pipe
}

fn compile_fitting(def: &FittingDef) -> Fitting {
    let mut fitting = Fitting::new(&def.fitting_type).with_quantity(def.quantity);
    if let Some(name) = &def.name {
        fitting = fitting.named(name);
    }
    fitting.diameter = def.diameter_m.map(m);
    fitting.k_factor = def.k_factor;
    fitting.equivalent_length = def.equivalent_length_m.map(m);
    fitting
}

fn compile_pump(def: &PumpDef) -> Pump {
    Pump {
        name: def.name.clone(),
        head: def.head_m.map(m),
        inlet_pressure: def.inlet_pressure_pa.map(pa),
        outlet_pressure: def.outlet_pressure_pa.map(pa),
        efficiency: def.efficiency,
        start_node: None,
        end_node: None,
    }
}

fn compile_equipment(def: &EquipmentDef) -> Equipment {
    let loss = match (def.pressure_drop_pa, def.coefficient) {
        (Some(dp), _) => Some(EquipmentLoss::Absolute(pa(dp))),
        (None, Some(coefficient)) => Some(EquipmentLoss::Coefficient {
            coefficient,
            reference: None,
        }),
        (None, None) => None,
    };
    Equipment {
        name: def.name.clone(),
        loss,
        start_node: None,
        end_node: None,
    }
}
