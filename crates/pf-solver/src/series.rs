//! Series evaluator: one flow rate through an ordered chain of leaves.

use crate::error::{SolverError, SolverResult};
use pf_components::physics::{head_from_pressure, pump_power};
use pf_components::{EvalContext, LossOrGain, Upstream, evaluate_element};
use pf_core::Warning;
use pf_core::units::{Length, Power, Pressure, VolumeRate, pa, watts};
use pf_graph::Element;

/// Pressure drop of a path and its sensitivity to flow.
///
/// The balancers only see this; how the path is built is up to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathDrop {
    /// Inlet minus outlet pressure in Pa.
    pub drop: f64,
    /// `d(drop)/dQ` estimated as `n |ΔP_friction| / |Q|`, Pa·s/m³.
    pub slope: f64,
}

/// Totals and per-element detail of a chain at one flow.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesResult {
    pub flow: VolumeRate,
    pub elements: Vec<LossOrGain>,
    /// Net drop: losses minus pump gains.
    pub total_drop: Pressure,
    pub head_loss: Length,
    /// Pump shaft power needed to overcome the net drop.
    pub required_power: Power,
    /// Shaft power of the pumps in the chain.
    pub pump_power: Power,
    /// Last pipe in the chain, handed to whatever follows it.
    pub upstream: Option<Upstream>,
    pub warnings: Vec<Warning>,
}

impl SeriesResult {
    /// Flow-dependent part of the drop.
    pub fn friction_drop(&self) -> Pressure {
        self.elements
            .iter()
            .fold(pa(0.0), |acc, e| acc + e.friction_drop())
    }

    pub fn slope(&self, exponent: f64) -> f64 {
        let q = self.flow.value.abs();
        if q <= 0.0 {
            return 0.0;
        }
        exponent * self.friction_drop().value.abs() / q
    }

    pub fn path_drop(&self, exponent: f64) -> PathDrop {
        PathDrop {
            drop: self.total_drop.value,
            slope: self.slope(exponent),
        }
    }
}

/// Evaluate `elements` in order at a constant `flow`.
///
/// Standalone fittings inherit the diameter and friction factor of the most
/// recent pipe, starting from `ctx.upstream`. `ctx.reference_pressure` is the
/// chain inlet pressure; each element sees it less the drop accumulated so far.
pub fn evaluate_series(
    elements: &[Element],
    flow: VolumeRate,
    ctx: &EvalContext<'_>,
) -> SolverResult<SeriesResult> {
    let mut upstream = ctx.upstream;
    let mut records = Vec::with_capacity(elements.len());
    let mut total = pa(0.0);
    let mut shaft = watts(0.0);

    for element in elements {
        if let Element::Network(id) = element {
            return Err(SolverError::NumericalError {
                what: format!("series chain holds nested network {id:?}; normalize it first"),
            });
        }
        let mut local = ctx.with_upstream(upstream);
        local.reference_pressure = ctx.reference_pressure.map(|p| p - total);
        let record = evaluate_element(element, flow, &local)?;
        if let Some(up) = record.upstream() {
            upstream = Some(up);
        }
        total += record.pressure_drop();
        if let Some(p) = record.shaft_power {
            shaft += p;
        }
        records.push(record);
    }

    let warnings = records.iter().flat_map(|r| r.warnings.iter().cloned()).collect();
    Ok(SeriesResult {
        flow,
        head_loss: head_from_pressure(total, ctx.fluid.density)?,
        required_power: pump_power(total, flow, ctx.pump_efficiency)?,
        pump_power: shaft,
        total_drop: total,
        elements: records,
        upstream,
        warnings,
    })
}
