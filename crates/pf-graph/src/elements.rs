//! Topology primitives: the leaves of a pipe network.

use pf_core::units::{Length, Pressure, VolumeRate, m, m3ps};
use std::fmt;

/// Seed flow for pipes without an annotated flow rate. Only a solver start point.
pub const SEED_FLOW_M3PS: f64 = 0.001;

/// Material assumed when a pipe does not name one.
pub const DEFAULT_MATERIAL: &str = "CS";

/// A named junction.
///
/// `pressure` and `flow_rate` are diagnostics written after a solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    pub name: String,
    pub elevation: Length,
    pub pressure: Option<Pressure>,
    pub flow_rate: Option<VolumeRate>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elevation: m(0.0),
            pressure: None,
            flow_rate: None,
        }
    }

    pub fn with_elevation(mut self, elevation: Length) -> Self {
        self.elevation = elevation;
        self
    }
}

/// Straight pipe run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pipe {
    pub name: String,
    /// Absent on both this and `internal_diameter` marks the pipe for sizing.
    pub nominal_diameter: Option<Length>,
    pub internal_diameter: Option<Length>,
    /// Falls back to the solver default when unset.
    pub length: Option<Length>,
    pub material: String,
    pub schedule: Option<String>,
    /// Overrides the material roughness.
    pub roughness: Option<Length>,
    /// Outlet minus inlet elevation. Taken from the end nodes when unset.
    pub elevation_change: Option<Length>,
    pub inlet_pressure: Option<Pressure>,
    pub outlet_pressure: Option<Pressure>,
    pub flow_rate: VolumeRate,
    /// Fittings installed on this run, evaluated at the pipe's velocity.
    pub fittings: Vec<Fitting>,
    pub start_node: Option<String>,
    pub end_node: Option<String>,
}

impl Pipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nominal_diameter: None,
            internal_diameter: None,
            length: None,
            material: DEFAULT_MATERIAL.to_string(),
            schedule: None,
            roughness: None,
            elevation_change: None,
            inlet_pressure: None,
            outlet_pressure: None,
            flow_rate: m3ps(SEED_FLOW_M3PS),
            fittings: Vec::new(),
            start_node: None,
            end_node: None,
        }
    }

    pub fn with_length(mut self, length: Length) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_internal_diameter(mut self, d: Length) -> Self {
        self.internal_diameter = Some(d);
        self
    }

    pub fn with_nominal_diameter(mut self, d: Length) -> Self {
        self.nominal_diameter = Some(d);
        self
    }

    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    pub fn with_roughness(mut self, roughness: Length) -> Self {
        self.roughness = Some(roughness);
        self
    }

    pub fn with_elevation_change(mut self, dz: Length) -> Self {
        self.elevation_change = Some(dz);
        self
    }

    pub fn with_flow_rate(mut self, q: VolumeRate) -> Self {
        self.flow_rate = q;
        self
    }

    pub fn with_fitting(mut self, fitting: Fitting) -> Self {
        self.fittings.push(fitting);
        self
    }

    /// True when no diameter is given and one must be selected.
    pub fn needs_sizing(&self) -> bool {
        self.internal_diameter.is_none() && self.nominal_diameter.is_none()
    }
}

/// Valve, bend or other local resistance.
///
/// Loss data is taken from the first available of: `k_factor`,
/// `equivalent_length`, the standards table entry for `fitting_type`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fitting {
    pub name: String,
    pub fitting_type: String,
    pub diameter: Option<Length>,
    pub quantity: u32,
    pub k_factor: Option<f64>,
    pub equivalent_length: Option<Length>,
    /// Node the fitting sits at, for node-and-edge networks.
    pub node: Option<String>,
}

impl Fitting {
    pub fn new(fitting_type: impl Into<String>) -> Self {
        let fitting_type = fitting_type.into();
        Self {
            name: fitting_type.clone(),
            fitting_type,
            diameter: None,
            quantity: 1,
            k_factor: None,
            equivalent_length: None,
            node: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_diameter(mut self, d: Length) -> Self {
        self.diameter = Some(d);
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k_factor = Some(k);
        self
    }

    pub fn with_equivalent_length(mut self, le: Length) -> Self {
        self.equivalent_length = Some(le);
        self
    }

    pub fn has_explicit_data(&self) -> bool {
        self.k_factor.is_some() || self.equivalent_length.is_some()
    }
}

/// Fixed pressure-gain element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pump {
    pub name: String,
    pub head: Option<Length>,
    pub inlet_pressure: Option<Pressure>,
    pub outlet_pressure: Option<Pressure>,
    /// Falls back to the solver default when unset.
    pub efficiency: Option<f64>,
    pub start_node: Option<String>,
    pub end_node: Option<String>,
}

impl Pump {
    pub fn with_head(name: impl Into<String>, head: Length) -> Self {
        Self {
            name: name.into(),
            head: Some(head),
            inlet_pressure: None,
            outlet_pressure: None,
            efficiency: None,
            start_node: None,
            end_node: None,
        }
    }

    pub fn with_pressures(name: impl Into<String>, inlet: Pressure, outlet: Pressure) -> Self {
        Self {
            name: name.into(),
            head: None,
            inlet_pressure: Some(inlet),
            outlet_pressure: Some(outlet),
            efficiency: None,
            start_node: None,
            end_node: None,
        }
    }

    pub fn efficiency(mut self, eta: f64) -> Self {
        self.efficiency = Some(eta);
        self
    }

    pub fn has_duty(&self) -> bool {
        self.head.is_some() || (self.inlet_pressure.is_some() && self.outlet_pressure.is_some())
    }
}

/// How a vessel or piece of equipment takes pressure out of the line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EquipmentLoss {
    Absolute(Pressure),
    /// Fraction of the pressure upstream of the equipment. Without its own
    /// reference, the running pressure of the chain is used: the engine's
    /// reference pressure less every drop ahead of the equipment. Graph
    /// edges see the engine's reference pressure unchanged.
    Coefficient {
        coefficient: f64,
        reference: Option<Pressure>,
    },
}

/// Vessel, exchanger or other fixed-drop equipment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Equipment {
    pub name: String,
    pub loss: Option<EquipmentLoss>,
    pub start_node: Option<String>,
    pub end_node: Option<String>,
}

impl Equipment {
    pub fn new(name: impl Into<String>, loss: EquipmentLoss) -> Self {
        Self {
            name: name.into(),
            loss: Some(loss),
            start_node: None,
            end_node: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Pipe,
    Fitting,
    Pump,
    Equipment,
    Network,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Pipe => "pipe",
            ElementKind::Fitting => "fitting",
            ElementKind::Pump => "pump",
            ElementKind::Equipment => "equipment",
            ElementKind::Network => "network",
        };
        f.write_str(s)
    }
}

/// Entry of a branch or network block.
///
/// Nested networks are referenced by id into the owning arena.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Element {
    Pipe(Pipe),
    Fitting(Fitting),
    Pump(Pump),
    Equipment(Equipment),
    Network(pf_core::NetId),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Pipe(_) => ElementKind::Pipe,
            Element::Fitting(_) => ElementKind::Fitting,
            Element::Pump(_) => ElementKind::Pump,
            Element::Equipment(_) => ElementKind::Equipment,
            Element::Network(_) => ElementKind::Network,
        }
    }

    /// Name for leaves; nested networks are named by their block.
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Pipe(p) => Some(&p.name),
            Element::Fitting(f) => Some(&f.name),
            Element::Pump(p) => Some(&p.name),
            Element::Equipment(e) => Some(&e.name),
            Element::Network(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Element::Network(_))
    }

    pub fn endpoints(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Element::Pipe(p) => (p.start_node.as_deref(), p.end_node.as_deref()),
            Element::Pump(p) => (p.start_node.as_deref(), p.end_node.as_deref()),
            Element::Equipment(e) => (e.start_node.as_deref(), e.end_node.as_deref()),
            Element::Fitting(_) | Element::Network(_) => (None, None),
        }
    }

    pub(crate) fn set_endpoints(&mut self, from: &str, to: &str) -> bool {
        let slots = match self {
            Element::Pipe(p) => (&mut p.start_node, &mut p.end_node),
            Element::Pump(p) => (&mut p.start_node, &mut p.end_node),
            Element::Equipment(e) => (&mut e.start_node, &mut e.end_node),
            Element::Fitting(_) | Element::Network(_) => return false,
        };
        *slots.0 = Some(from.to_string());
        *slots.1 = Some(to.to_string());
        true
    }
}

impl From<Pipe> for Element {
    fn from(p: Pipe) -> Self {
        Element::Pipe(p)
    }
}

impl From<Fitting> for Element {
    fn from(f: Fitting) -> Self {
        Element::Fitting(f)
    }
}

impl From<Pump> for Element {
    fn from(p: Pump) -> Self {
        Element::Pump(p)
    }
}

impl From<Equipment> for Element {
    fn from(e: Equipment) -> Self {
        Element::Equipment(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{inch, pa};

    #[test]
    fn pipe_defaults() {
        let p = Pipe::new("P1");
        assert!(p.needs_sizing());
        assert_eq!(p.material, DEFAULT_MATERIAL);
        assert!((p.flow_rate.value - SEED_FLOW_M3PS).abs() < 1e-15);
        assert!(!p.with_nominal_diameter(inch(4.0)).needs_sizing());
    }

    #[test]
    fn pump_duty_requires_head_or_pressure_pair() {
        assert!(Pump::with_head("P", m(10.0)).has_duty());
        assert!(Pump::with_pressures("P", pa(1e5), pa(3e5)).has_duty());
        let mut p = Pump::with_pressures("P", pa(1e5), pa(3e5));
        p.outlet_pressure = None;
        assert!(!p.has_duty());
    }

    #[test]
    fn endpoints_only_on_two_port_elements() {
        let mut e = Element::from(Pipe::new("P"));
        assert!(e.set_endpoints("A", "B"));
        assert_eq!(e.endpoints(), (Some("A"), Some("B")));

        let mut f = Element::from(Fitting::new("elbow_90"));
        assert!(!f.set_endpoints("A", "B"));
        assert_eq!(f.kind().to_string(), "fitting");
    }
}
