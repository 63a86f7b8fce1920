//! What `PipelineEngine::fit` binds.

use pf_core::units::{
    Density, DynVisc, KinVisc, Length, MassRate, Pressure, Temperature, Velocity, VolumeRate,
};
use pf_fluids::{FluidCategory, Species};
use pf_graph::{Element, Pipe, PipelineNetwork};
use pf_solver::SolverConfig;
use serde::Serialize;

/// Where the density and viscosity come from.
#[derive(Debug, Clone, PartialEq)]
pub enum FluidSpec {
    Constant {
        density: Density,
        viscosity: DynVisc,
    },
    Kinematic {
        density: Density,
        kinematic_viscosity: KinVisc,
    },
    /// Library properties at a state point.
    Library {
        species: Species,
        temperature: Temperature,
        pressure: Pressure,
    },
}

/// How the design flow is given.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowSpec {
    Volumetric(VolumeRate),
    /// Divided by the fluid density.
    Mass(MassRate),
    /// `Q = v πD²/4`. Without a diameter the single pipe's internal
    /// diameter is used.
    VelocityDiameter {
        velocity: Velocity,
        diameter: Option<Length>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Topology {
    Pipe(Pipe),
    /// Leaves in flow order. Nested networks are not allowed here.
    Chain(Vec<Element>),
    Network(PipelineNetwork),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub fluid: FluidSpec,
    /// Velocity band used for sizing and advisories. Taken from the species
    /// for library fluids, water otherwise.
    pub category: Option<FluidCategory>,
    pub flow: Option<FlowSpec>,
    pub topology: Option<Topology>,
    /// Pressure budget for sizing; overrides the economic rule.
    pub available_dp: Option<Pressure>,
    pub economic: bool,
    pub solver: SolverConfig,
    /// Reference for coefficient-style equipment and graph inlets.
    pub reference_pressure: Option<Pressure>,
}

impl EngineConfig {
    pub fn new(fluid: FluidSpec) -> Self {
        Self {
            fluid,
            category: None,
            flow: None,
            topology: None,
            available_dp: None,
            economic: false,
            solver: SolverConfig::default(),
            reference_pressure: None,
        }
    }

    pub fn with_category(mut self, category: FluidCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_flow(mut self, flow: FlowSpec) -> Self {
        self.flow = Some(flow);
        self
    }

    pub fn with_volumetric_flow(self, q: VolumeRate) -> Self {
        self.with_flow(FlowSpec::Volumetric(q))
    }

    pub fn with_pipe(mut self, pipe: Pipe) -> Self {
        self.topology = Some(Topology::Pipe(pipe));
        self
    }

    pub fn with_chain(mut self, elements: Vec<Element>) -> Self {
        self.topology = Some(Topology::Chain(elements));
        self
    }

    pub fn with_network(mut self, net: PipelineNetwork) -> Self {
        self.topology = Some(Topology::Network(net));
        self
    }

    pub fn with_available_dp(mut self, dp: Pressure) -> Self {
        self.available_dp = Some(dp);
        self
    }

    pub fn economic(mut self) -> Self {
        self.economic = true;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_reference_pressure(mut self, p: Pressure) -> Self {
        self.reference_pressure = Some(p);
        self
    }
}
