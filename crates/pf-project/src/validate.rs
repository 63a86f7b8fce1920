//! Project validation logic.
//!
//! Checks what can be checked on the file alone: unique ids and names,
//! resolvable node references, and physically meaningful numbers. Anything
//! that needs the standards tables or the fluid library is left to the engine.

use crate::schema::{
    ElementDef, EquipmentDef, FittingDef, FlowDef, FluidDef, NetworkDef, NodeDef, PipeDef, Project,
    PumpDef, SizingDef, SolverDef, SystemDef, TopologyDef,
};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing data: {what}")]
    MissingData { what: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut system_ids = HashSet::new();
    for system in &project.systems {
        if !system_ids.insert(&system.id) {
            return Err(ValidationError::DuplicateId {
                id: system.id.clone(),
                context: "systems".to_string(),
            });
        }
        validate_system(system)?;
    }
    Ok(())
}

pub fn validate_system(system: &SystemDef) -> Result<(), ValidationError> {
    let ctx = format!("system '{}'", system.id);
    validate_fluid(&system.fluid, &ctx)?;
    validate_flow(&system.flow, &ctx)?;
    validate_sizing(&system.sizing, &ctx)?;
    validate_solver(&system.solver, &ctx)?;
    if let Some(p) = system.reference_pressure_pa {
        finite(p, &format!("{ctx} reference_pressure_pa"))?;
    }

    match &system.topology {
        TopologyDef::Pipe(pipe) => validate_pipe(pipe, &[], &ctx),
        TopologyDef::Chain { elements } => {
            if elements.is_empty() {
                return Err(ValidationError::MissingData {
                    what: format!("{ctx} chain has no elements"),
                });
            }
            for element in elements {
                if matches!(element, ElementDef::Network(_)) {
                    return Err(ValidationError::InvalidValue {
                        field: format!("{ctx} chain element '{}'", element.name()),
                        value: "network".to_string(),
                        reason: "chains hold leaf elements only".to_string(),
                    });
                }
                validate_element(element, &[], &ctx)?;
            }
            Ok(())
        }
        TopologyDef::Network(net) => validate_network(net, &mut Vec::new(), &ctx),
    }
}

fn validate_fluid(fluid: &FluidDef, ctx: &str) -> Result<(), ValidationError> {
    match fluid {
        FluidDef::Constant {
            density_kg_m3,
            viscosity_pa_s,
        } => {
            positive(*density_kg_m3, &format!("{ctx} density_kg_m3"))?;
            positive(*viscosity_pa_s, &format!("{ctx} viscosity_pa_s"))
        }
        FluidDef::Kinematic {
            density_kg_m3,
            kinematic_viscosity_m2_s,
        } => {
            positive(*density_kg_m3, &format!("{ctx} density_kg_m3"))?;
            positive(*kinematic_viscosity_m2_s, &format!("{ctx} kinematic_viscosity_m2_s"))
        }
        FluidDef::Library {
            species,
            temperature_k,
            pressure_pa,
        } => {
            if species.trim().is_empty() {
                return Err(ValidationError::MissingData {
                    what: format!("{ctx} fluid species"),
                });
            }
            positive(*temperature_k, &format!("{ctx} temperature_k"))?;
            positive(*pressure_pa, &format!("{ctx} pressure_pa"))
        }
    }
}

fn validate_flow(flow: &FlowDef, ctx: &str) -> Result<(), ValidationError> {
    match flow {
        FlowDef::Volumetric { flow_m3_s } => finite(*flow_m3_s, &format!("{ctx} flow_m3_s")),
        FlowDef::Mass { mass_flow_kg_s } => finite(*mass_flow_kg_s, &format!("{ctx} mass_flow_kg_s")),
        FlowDef::VelocityDiameter {
            velocity_m_s,
            diameter_m,
        } => {
            finite(*velocity_m_s, &format!("{ctx} velocity_m_s"))?;
            positive(*diameter_m, &format!("{ctx} diameter_m"))
        }
    }
}

fn validate_sizing(sizing: &SizingDef, ctx: &str) -> Result<(), ValidationError> {
    match sizing.available_dp_pa {
        Some(dp) => positive(dp, &format!("{ctx} available_dp_pa")),
        None => Ok(()),
    }
}

fn validate_solver(solver: &SolverDef, ctx: &str) -> Result<(), ValidationError> {
    for (field, value) in [
        ("flow_tolerance_m3_s", solver.flow_tolerance_m3_s),
        ("pressure_tolerance_pa", solver.pressure_tolerance_pa),
        ("default_length_m", solver.default_length_m),
        ("default_diameter_m", solver.default_diameter_m),
    ] {
        if let Some(v) = value {
            positive(v, &format!("{ctx} solver {field}"))?;
        }
    }
    if let Some(eta) = solver.pump_efficiency {
        efficiency(eta, &format!("{ctx} solver pump_efficiency"))?;
    }
    for (field, value) in [
        ("max_iterations", solver.max_iterations),
        ("hardy_cross_max_iterations", solver.hardy_cross_max_iterations),
    ] {
        if value == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx} solver {field}"),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
    }
    Ok(())
}

/// `scopes` holds the node tables of the enclosing networks, innermost last.
fn validate_network<'a>(
    net: &'a NetworkDef,
    scopes: &mut Vec<&'a [NodeDef]>,
    ctx: &str,
) -> Result<(), ValidationError> {
    let ctx = format!("{ctx} network '{}'", net.name);
    let mut names = HashSet::new();
    for node in &net.nodes {
        if !names.insert(node.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.name.clone(),
                context: format!("{ctx} nodes"),
            });
        }
        finite(node.elevation_m, &format!("{ctx} node '{}' elevation_m", node.name))?;
    }

    scopes.push(&net.nodes);
    for terminal in [&net.inlet, &net.outlet].into_iter().flatten() {
        check_node(terminal, scopes.as_slice(), &format!("{ctx} terminal"))?;
    }
    let mut element_names = HashSet::new();
    for element in &net.elements {
        if !element_names.insert(element.name()) && !matches!(element, ElementDef::Fitting(_)) {
            return Err(ValidationError::DuplicateId {
                id: element.name().to_string(),
                context: format!("{ctx} elements"),
            });
        }
        match element {
            ElementDef::Network(child) => validate_network(child, scopes, &ctx)?,
            leaf => validate_element(leaf, scopes.as_slice(), &ctx)?,
        }
    }
    scopes.pop();
    Ok(())
}

fn validate_element(element: &ElementDef, scopes: &[&[NodeDef]], ctx: &str) -> Result<(), ValidationError> {
    match element {
        ElementDef::Pipe(pipe) => validate_pipe(pipe, scopes, ctx),
        ElementDef::Fitting(fitting) => validate_fitting(fitting, scopes, ctx),
        ElementDef::Pump(pump) => validate_pump(pump, ctx),
        ElementDef::Equipment(equipment) => validate_equipment(equipment, ctx),
        ElementDef::Network(_) => Ok(()),
    }?;
    let (from, to) = element.endpoints();
    match (from, to) {
        (Some(a), Some(b)) => {
            let field = format!("{ctx} element '{}'", element.name());
            if a == b {
                return Err(ValidationError::InvalidValue {
                    field,
                    value: a.to_string(),
                    reason: "element starts and ends at the same node".to_string(),
                });
            }
            check_node(a, scopes, &field)?;
            check_node(b, scopes, &field)
        }
        (None, None) => Ok(()),
        _ => Err(ValidationError::MissingData {
            what: format!("{ctx} element '{}' needs both 'from' and 'to'", element.name()),
        }),
    }
}

fn validate_pipe(pipe: &PipeDef, scopes: &[&[NodeDef]], ctx: &str) -> Result<(), ValidationError> {
    let ctx = format!("{ctx} pipe '{}'", pipe.name);
    for (field, value) in [
        ("length_m", pipe.length_m),
        ("nominal_diameter_m", pipe.nominal_diameter_m),
        ("internal_diameter_m", pipe.internal_diameter_m),
    ] {
        if let Some(v) = value {
            positive(v, &format!("{ctx} {field}"))?;
        }
    }
    if let Some(eps) = pipe.roughness_m
        && !(eps.is_finite() && eps >= 0.0)
    {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} roughness_m"),
            value: eps.to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    if let Some(dz) = pipe.elevation_change_m {
        finite(dz, &format!("{ctx} elevation_change_m"))?;
    }
    for fitting in &pipe.fittings {
        validate_fitting(fitting, scopes, &ctx)?;
    }
    Ok(())
}

fn validate_fitting(fitting: &FittingDef, scopes: &[&[NodeDef]], ctx: &str) -> Result<(), ValidationError> {
    let ctx = format!("{ctx} fitting '{}'", fitting.fitting_type);
    if fitting.fitting_type.trim().is_empty() && fitting.k_factor.is_none() && fitting.equivalent_length_m.is_none() {
        return Err(ValidationError::MissingData {
            what: format!("{ctx} needs a type, a K-factor or an equivalent length"),
        });
    }
    if fitting.quantity == 0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} quantity"),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if let Some(k) = fitting.k_factor
        && !(k.is_finite() && k >= 0.0)
    {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx} k_factor"),
            value: k.to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    for (field, value) in [
        ("diameter_m", fitting.diameter_m),
        ("equivalent_length_m", fitting.equivalent_length_m),
    ] {
        if let Some(v) = value {
            positive(v, &format!("{ctx} {field}"))?;
        }
    }
    if let Some(node) = &fitting.node {
        check_node(node, scopes, &ctx)?;
    }
    Ok(())
}

fn validate_pump(pump: &PumpDef, ctx: &str) -> Result<(), ValidationError> {
    let ctx = format!("{ctx} pump '{}'", pump.name);
    match (pump.head_m, pump.inlet_pressure_pa, pump.outlet_pressure_pa) {
        (Some(head), _, _) => finite(head, &format!("{ctx} head_m"))?,
        (None, Some(p_in), Some(p_out)) => {
            finite(p_in, &format!("{ctx} inlet_pressure_pa"))?;
            finite(p_out, &format!("{ctx} outlet_pressure_pa"))?;
        }
        _ => {
            return Err(ValidationError::MissingData {
                what: format!("{ctx} needs head_m or both inlet and outlet pressures"),
            });
        }
    }
    if let Some(eta) = pump.efficiency {
        efficiency(eta, &format!("{ctx} efficiency"))?;
    }
    Ok(())
}

fn validate_equipment(equipment: &EquipmentDef, ctx: &str) -> Result<(), ValidationError> {
    let ctx = format!("{ctx} equipment '{}'", equipment.name);
    match (equipment.pressure_drop_pa, equipment.coefficient) {
        (Some(dp), _) => finite(dp, &format!("{ctx} pressure_drop_pa")),
        (None, Some(c)) => finite(c, &format!("{ctx} coefficient")),
        (None, None) => Err(ValidationError::MissingData {
            what: format!("{ctx} needs pressure_drop_pa or coefficient"),
        }),
    }
}

fn check_node(name: &str, scopes: &[&[NodeDef]], context: &str) -> Result<(), ValidationError> {
    if scopes.iter().rev().any(|nodes| nodes.iter().any(|n| n.name == name)) {
        Ok(())
    } else {
        Err(ValidationError::MissingReference {
            id: name.to_string(),
            context: context.to_string(),
        })
    }
}

fn finite(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
    }
}

fn positive(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive".to_string(),
        })
    }
}

fn efficiency(value: f64, field: &str) -> Result<(), ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must lie in (0, 1]".to_string(),
        })
    }
}
