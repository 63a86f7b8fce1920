//! Pure hydraulic relations.
//!
//! Every function takes and returns uom quantities and works in SI base units
//! internally. Losses are magnitudes; direction is applied by the caller.

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};
use pf_core::units::constants::G0_MPS2;
use pf_core::units::{
    Area, Density, DynVisc, KinVisc, Length, MassRate, Power, Pressure, Velocity, VolumeRate, m,
    m3ps, mm, mps, pa, watts,
};
use pf_graph::{EquipmentLoss, Pump};
use std::f64::consts::PI;
use uom::si::area::square_meter;

/// Flow area of a circular pipe.
pub fn pipe_area(diameter: Length) -> ComponentResult<Area> {
    let d = positive(diameter.value, "diameter")?;
    Ok(Area::new::<square_meter>(PI * d * d / 4.0))
}

/// Mean velocity `Q / (π D² / 4)`. Signed like the flow.
pub fn velocity(flow: VolumeRate, diameter: Length) -> ComponentResult<Velocity> {
    let q = check_finite(flow.value, "flow rate")?;
    let area = pipe_area(diameter)?;
    Ok(mps(q / area.value))
}

/// Flow carried at a velocity through a diameter.
pub fn flow_from_velocity(velocity: Velocity, diameter: Length) -> ComponentResult<VolumeRate> {
    let v = check_finite(velocity.value, "velocity")?;
    let area = pipe_area(diameter)?;
    Ok(m3ps(v * area.value))
}

pub fn volumetric_flow(mass_flow: MassRate, density: Density) -> ComponentResult<VolumeRate> {
    let rho = positive_property(density.value, "density must be positive")?;
    let w = check_finite(mass_flow.value, "mass flow rate")?;
    Ok(m3ps(w / rho))
}

/// Reynolds number `ρ|v|D/μ`.
pub fn reynolds(
    density: Density,
    velocity: Velocity,
    diameter: Length,
    viscosity: DynVisc,
) -> ComponentResult<f64> {
    let rho = positive_property(density.value, "density must be positive")?;
    let mu = positive_property(viscosity.value, "viscosity must be positive")?;
    let d = positive(diameter.value, "diameter")?;
    check_finite(rho * velocity.value.abs() * d / mu, "Reynolds number")
}

/// Reynolds number from kinematic viscosity, `|v|D/ν`.
pub fn reynolds_kinematic(
    velocity: Velocity,
    diameter: Length,
    kinematic_viscosity: KinVisc,
) -> ComponentResult<f64> {
    let nu = positive_property(kinematic_viscosity.value, "kinematic viscosity must be positive")?;
    let d = positive(diameter.value, "diameter")?;
    check_finite(velocity.value.abs() * d / nu, "Reynolds number")
}

/// Dynamic pressure `ρv²/2`.
pub fn dynamic_pressure(density: Density, velocity: Velocity) -> Pressure {
    pa(0.5 * density.value * velocity.value * velocity.value)
}

/// Darcy-Weisbach friction loss `f (L/D) ρv²/2`.
pub fn major_loss(
    friction_factor: f64,
    length: Length,
    diameter: Length,
    density: Density,
    velocity: Velocity,
) -> ComponentResult<Pressure> {
    let d = positive(diameter.value, "diameter")?;
    let l = positive(length.value, "length")?;
    let dp = friction_factor * (l / d) * dynamic_pressure(density, velocity).value;
    Ok(pa(check_finite(dp, "major loss")?))
}

/// Local loss from a resistance coefficient, `K ρv²/2`.
pub fn k_loss(k: f64, density: Density, velocity: Velocity) -> ComponentResult<Pressure> {
    if !k.is_finite() || k < 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "K-factor must be non-negative",
        });
    }
    Ok(pa(k * dynamic_pressure(density, velocity).value))
}

/// Hydrostatic change `ρ g Δz`, positive when the outlet is higher.
pub fn elevation_loss(density: Density, elevation_change: Length) -> Pressure {
    pa(density.value * G0_MPS2 * elevation_change.value)
}

/// Pressure a pump adds: `ρ g H` from head, else outlet minus inlet.
pub fn pump_gain(pump: &Pump, density: Density) -> ComponentResult<Pressure> {
    if let Some(head) = pump.head {
        return Ok(pa(density.value * G0_MPS2 * check_finite(head.value, "pump head")?));
    }
    match (pump.inlet_pressure, pump.outlet_pressure) {
        (Some(p_in), Some(p_out)) => Ok(p_out - p_in),
        _ => Err(ComponentError::missing(format!(
            "head or inlet/outlet pressures for pump '{}'",
            pump.name
        ))),
    }
}

/// Fixed equipment drop. Coefficient losses need a reference pressure,
/// taken from the equipment first and `fallback` second.
pub fn equipment_loss(
    loss: EquipmentLoss,
    fallback: Option<Pressure>,
) -> ComponentResult<Pressure> {
    match loss {
        EquipmentLoss::Absolute(dp) => Ok(pa(check_finite(dp.value, "equipment pressure drop")?)),
        EquipmentLoss::Coefficient {
            coefficient,
            reference,
        } => {
            let reference = reference.or(fallback).ok_or_else(|| {
                ComponentError::missing("reference pressure for coefficient equipment loss")
            })?;
            Ok(pa(check_finite(
                coefficient * reference.value,
                "equipment pressure drop",
            )?))
        }
    }
}

/// Head equivalent of a pressure, `ΔP / (ρ g)`.
pub fn head_from_pressure(dp: Pressure, density: Density) -> ComponentResult<Length> {
    let rho = positive_property(density.value, "density must be positive")?;
    Ok(m(dp.value / (rho * G0_MPS2)))
}

/// Shaft power to push `flow` against `dp`: `max(ΔP, 0)·|Q| / η`.
pub fn pump_power(dp: Pressure, flow: VolumeRate, efficiency: f64) -> ComponentResult<Power> {
    if !(efficiency > 0.0 && efficiency <= 1.0) {
        return Err(ComponentError::NonPhysical {
            what: "pump efficiency must be in (0, 1]",
        });
    }
    Ok(watts(dp.value.max(0.0) * flow.value.abs() / efficiency))
}

/// Economic optimum diameter, `D[mm] = 293 ṁ^0.53 ρ^-0.37` with ṁ in kg/s.
pub fn economic_diameter(mass_flow: MassRate, density: Density) -> ComponentResult<Length> {
    let rho = positive_property(density.value, "density must be positive")?;
    let w = mass_flow.value.abs();
    if !w.is_finite() || w == 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "mass flow must be non-zero for economic sizing",
        });
    }
    Ok(mm(293.0 * w.powf(0.53) * rho.powf(-0.37)))
}

fn positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidGeometry {
            element: String::new(),
            what,
            value,
        })
    }
}

fn positive_property(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::NonPhysical { what })
    }
}
