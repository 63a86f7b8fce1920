//! Project schema definitions.
//!
//! Quantities are plain SI numbers with the unit in the field name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub systems: Vec<SystemDef>,
}

impl Project {
    pub fn system(&self, id: &str) -> Option<&SystemDef> {
        self.systems.iter().find(|s| s.id == id)
    }
}

/// One pipeline design case: a fluid, a flow and a topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub id: String,
    pub name: String,
    pub fluid: FluidDef,
    /// Recommended-velocity category; taken from the fluid when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub flow: FlowDef,
    pub topology: TopologyDef,
    #[serde(default)]
    pub sizing: SizingDef,
    #[serde(default)]
    pub solver: SolverDef,
    /// Reference for coefficient-style equipment losses and graph inlets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_pressure_pa: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FluidDef {
    Constant {
        density_kg_m3: f64,
        viscosity_pa_s: f64,
    },
    Kinematic {
        density_kg_m3: f64,
        kinematic_viscosity_m2_s: f64,
    },
    /// Properties from the fluid library at a state point.
    Library {
        species: String,
        temperature_k: f64,
        pressure_pa: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FlowDef {
    Volumetric { flow_m3_s: f64 },
    Mass { mass_flow_kg_s: f64 },
    VelocityDiameter { velocity_m_s: f64, diameter_m: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TopologyDef {
    Pipe(PipeDef),
    Chain {
        #[serde(default)]
        elements: Vec<ElementDef>,
    },
    Network(NetworkDef),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDef {
    #[default]
    Series,
    Parallel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub name: String,
    #[serde(default)]
    pub connection: ConnectionDef,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    /// Graph terminals; default to the first and last node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub name: String,
    #[serde(default)]
    pub elevation_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ElementDef {
    Pipe(PipeDef),
    Fitting(FittingDef),
    Pump(PumpDef),
    Equipment(EquipmentDef),
    Network(NetworkDef),
}

impl ElementDef {
    pub fn name(&self) -> &str {
        match self {
            ElementDef::Pipe(p) => &p.name,
            ElementDef::Fitting(f) => f.name.as_deref().unwrap_or(&f.fitting_type),
            ElementDef::Pump(p) => &p.name,
            ElementDef::Equipment(e) => &e.name,
            ElementDef::Network(n) => &n.name,
        }
    }

    /// Start and end node, for two-port elements placed in a graph.
    pub fn endpoints(&self) -> (Option<&str>, Option<&str>) {
        match self {
            ElementDef::Pipe(p) => (p.from.as_deref(), p.to.as_deref()),
            ElementDef::Pump(p) => (p.from.as_deref(), p.to.as_deref()),
            ElementDef::Equipment(e) => (e.from.as_deref(), e.to.as_deref()),
            ElementDef::Fitting(_) | ElementDef::Network(_) => (None, None),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PipeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_diameter_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_diameter_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_change_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fittings: Vec<FittingDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittingDef {
    pub fitting_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalent_length_m: Option<f64>,
    /// Graph node the fitting sits at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PumpDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlet_pressure_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_pressure_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentDef {
    pub name: String,
    /// Fixed drop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_drop_pa: Option<f64>,
    /// Fraction of the reference pressure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// How unsized pipes are sized. Velocity band unless a budget or the
/// economic rule is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SizingDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_dp_pa: Option<f64>,
    #[serde(default)]
    pub economic: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MethodDef {
    #[default]
    Auto,
    ParallelResolver,
    HardyCross,
    Matrix,
    Dual,
}

/// Solver overrides. Unset fields keep the engine defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SolverDef {
    #[serde(default)]
    pub method: MethodDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardy_cross_max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_tolerance_m3_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_tolerance_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_length_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_diameter_m: Option<f64>,
    #[serde(default)]
    pub parallel_branches: bool,
}
