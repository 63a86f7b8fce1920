//! Element evaluation.
//!
//! Each leaf element turns a flow rate into a [`LossOrGain`] record. The
//! series evaluator dispatches over [`Element`] with a closed `match`
//! ([`evaluate_element`]); nested networks are the network evaluator's job.

use crate::common::{check_positive, flow_direction};
use crate::error::{ComponentError, ComponentResult};
use crate::friction::{FlowRegime, FrictionConfig, friction_factor};
use crate::physics::{
    elevation_loss, equipment_loss, head_from_pressure, k_loss, major_loss, pump_gain, pump_power,
    reynolds, velocity,
};
use pf_core::units::{Length, Power, Pressure, Velocity, VolumeRate, m, pa};
use pf_core::Warning;
use pf_fluids::{FluidCategory, FluidState};
use pf_graph::{Element, ElementKind, Equipment, Fitting, Pipe, Pump};
use pf_standards::StandardsProvider;

/// Shaft efficiency assumed for pumps that do not state one.
pub const DEFAULT_PUMP_EFFICIENCY: f64 = 0.70;

/// Material whose roughness is used for fittings with no upstream pipe.
const FITTING_MATERIAL: &str = pf_graph::elements::DEFAULT_MATERIAL;

/// The most recent pipe upstream in a branch. Standalone fittings borrow its
/// diameter and friction factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Upstream {
    pub diameter: Length,
    pub friction_factor: f64,
}

/// Everything an element needs besides its own data and the flow.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub fluid: FluidState,
    pub standards: &'a dyn StandardsProvider,
    pub friction: FrictionConfig,
    /// Selects the recommended velocity band.
    pub category: FluidCategory,
    pub default_length: Length,
    pub default_diameter: Option<Length>,
    /// Pressure at the element's inlet, used by coefficient-style equipment.
    /// The series evaluator lowers it as a chain accumulates drop.
    pub reference_pressure: Option<Pressure>,
    pub pump_efficiency: f64,
    pub velocity_check: bool,
    pub upstream: Option<Upstream>,
}

impl<'a> EvalContext<'a> {
    pub fn new(fluid: FluidState, standards: &'a dyn StandardsProvider) -> Self {
        Self {
            fluid,
            standards,
            friction: FrictionConfig::default(),
            category: FluidCategory::default(),
            default_length: m(1.0),
            default_diameter: None,
            reference_pressure: None,
            pump_efficiency: DEFAULT_PUMP_EFFICIENCY,
            velocity_check: true,
            upstream: None,
        }
    }

    pub fn with_upstream(mut self, upstream: Option<Upstream>) -> Self {
        self.upstream = upstream;
        self
    }
}

/// Pressure change across one element at one flow rate.
///
/// Loss components are magnitudes; [`LossOrGain::pressure_drop`] applies the
/// flow direction. Positive drop means the outlet pressure is lower.
#[derive(Clone, Debug, PartialEq)]
pub struct LossOrGain {
    pub name: String,
    pub kind: ElementKind,
    pub flow: VolumeRate,
    pub diameter: Option<Length>,
    pub length: Option<Length>,
    pub velocity: Option<Velocity>,
    pub reynolds: Option<f64>,
    pub friction_factor: Option<f64>,
    /// Total resistance coefficient of fittings, quantity included.
    pub k_factor: Option<f64>,
    /// Straight-pipe friction.
    pub major: Pressure,
    /// Fittings.
    pub minor: Pressure,
    /// `ρ g Δz`, signed by the elevation change.
    pub elevation: Pressure,
    pub equipment: Pressure,
    /// Pump pressure gain.
    pub gain: Pressure,
    pub shaft_power: Option<Power>,
    pub warnings: Vec<Warning>,
}

impl LossOrGain {
    pub fn new(name: impl Into<String>, kind: ElementKind, flow: VolumeRate) -> Self {
        Self {
            name: name.into(),
            kind,
            flow,
            diameter: None,
            length: None,
            velocity: None,
            reynolds: None,
            friction_factor: None,
            k_factor: None,
            major: pa(0.0),
            minor: pa(0.0),
            elevation: pa(0.0),
            equipment: pa(0.0),
            gain: pa(0.0),
            shaft_power: None,
            warnings: Vec::new(),
        }
    }

    pub fn direction(&self) -> f64 {
        flow_direction(self.flow.value)
    }

    /// Flow-dependent part of the drop, signed with the flow.
    pub fn friction_drop(&self) -> Pressure {
        (self.major + self.minor) * self.direction()
    }

    /// Flow-independent part: elevation and pump gain, plus equipment drop
    /// opposing the flow.
    pub fn static_drop(&self) -> Pressure {
        self.elevation - self.gain + self.equipment * self.direction()
    }

    pub fn pressure_drop(&self) -> Pressure {
        self.friction_drop() + self.static_drop()
    }

    pub fn head_loss(&self, fluid: &FluidState) -> ComponentResult<Length> {
        head_from_pressure(self.pressure_drop(), fluid.density)
    }

    /// Diameter and friction factor to hand downstream, for pipes only.
    pub fn upstream(&self) -> Option<Upstream> {
        match (self.kind, self.diameter, self.friction_factor) {
            (ElementKind::Pipe, Some(diameter), Some(friction_factor)) => Some(Upstream {
                diameter,
                friction_factor,
            }),
            _ => None,
        }
    }
}

/// Physics of one element kind.
pub trait Evaluate {
    fn evaluate(&self, flow: VolumeRate, ctx: &EvalContext<'_>) -> ComponentResult<LossOrGain>;
}

/// Closed dispatch over the leaf element kinds.
pub fn evaluate_element(
    element: &Element,
    flow: VolumeRate,
    ctx: &EvalContext<'_>,
) -> ComponentResult<LossOrGain> {
    match element {
        Element::Pipe(p) => p.evaluate(flow, ctx),
        Element::Fitting(f) => f.evaluate(flow, ctx),
        Element::Pump(p) => p.evaluate(flow, ctx),
        Element::Equipment(e) => e.evaluate(flow, ctx),
        Element::Network(_) => Err(ComponentError::NotSupported {
            what: "nested networks are evaluated by the network evaluator",
        }),
    }
}

/// Diameter used for a pipe: internal, then nominal (via the schedule table
/// when tabulated), then the engine default. `None` means it must be sized.
pub fn resolve_diameter(pipe: &Pipe, ctx: &EvalContext<'_>) -> Option<Length> {
    if let Some(d) = pipe.internal_diameter {
        return Some(d);
    }
    if let Some(nominal) = pipe.nominal_diameter {
        return Some(
            ctx.standards
                .internal_diameter(nominal, pipe.schedule.as_deref())
                .unwrap_or(nominal),
        );
    }
    ctx.default_diameter
}

/// Explicit roughness, else the material's.
pub fn pipe_roughness(pipe: &Pipe, ctx: &EvalContext<'_>) -> Length {
    pipe.roughness
        .unwrap_or_else(|| ctx.standards.roughness(&pipe.material))
}

impl Evaluate for Pipe {
    fn evaluate(&self, flow: VolumeRate, ctx: &EvalContext<'_>) -> ComponentResult<LossOrGain> {
        let d = resolve_diameter(self, ctx)
            .ok_or_else(|| ComponentError::missing(format!("diameter of pipe '{}'", self.name)))?;
        check_positive(d.value, &self.name, "diameter")?;
        let length = self.length.unwrap_or(ctx.default_length);
        check_positive(length.value, &self.name, "length")?;

        let rho = ctx.fluid.density;
        let v = velocity(flow, d)?;
        let mut out = LossOrGain::new(&self.name, ElementKind::Pipe, flow);
        out.diameter = Some(d);
        out.length = Some(length);
        out.velocity = Some(v);
        out.elevation = elevation_loss(rho, self.elevation_change.unwrap_or(m(0.0)));
        if out.direction() == 0.0 {
            out.reynolds = Some(0.0);
            return Ok(out);
        }

        let re = reynolds(rho, v, d, ctx.fluid.viscosity)?;
        let ff = friction_factor(re, d, pipe_roughness(self, ctx), &ctx.friction)?;
        if !ff.converged {
            out.warnings.push(Warning::convergence(
                &self.name,
                format!(
                    "friction factor not converged after {} iterations (f = {:.5})",
                    ff.iterations, ff.value
                ),
            ));
        }
        out.reynolds = Some(re);
        out.friction_factor = Some(ff.value);
        out.major = major_loss(ff.value, length, d, rho, v)?;

        if !self.fittings.is_empty() {
            let mut k_total = 0.0;
            for fitting in &self.fittings {
                let lookup_d = fitting.diameter.unwrap_or(d);
                let r = fitting_resistance(fitting, lookup_d, ctx, || Ok(ff.value))?;
                k_total += r.k_total;
            }
            out.k_factor = Some(k_total);
            out.minor = k_loss(k_total, rho, v)?;
        }

        regime_advisory(&mut out, re, &ctx.friction);
        velocity_advisory(&mut out, v, ctx);
        Ok(out)
    }
}

impl Evaluate for Fitting {
    fn evaluate(&self, flow: VolumeRate, ctx: &EvalContext<'_>) -> ComponentResult<LossOrGain> {
        let d = self
            .diameter
            .or(ctx.upstream.map(|u| u.diameter))
            .ok_or_else(|| {
                ComponentError::missing(format!("diameter for fitting '{}'", self.name))
            })?;
        check_positive(d.value, &self.name, "diameter")?;

        let rho = ctx.fluid.density;
        let v = velocity(flow, d)?;
        let mut out = LossOrGain::new(&self.name, ElementKind::Fitting, flow);
        out.diameter = Some(d);
        out.velocity = Some(v);
        if out.direction() == 0.0 {
            return Ok(out);
        }

        let re = reynolds(rho, v, d, ctx.fluid.viscosity)?;
        out.reynolds = Some(re);
        let own_friction = || -> ComponentResult<f64> {
            match ctx.upstream {
                Some(up) => Ok(up.friction_factor),
                None => {
                    let eps = ctx.standards.roughness(FITTING_MATERIAL);
                    Ok(friction_factor(re, d, eps, &ctx.friction)?.value)
                }
            }
        };
        let r = fitting_resistance(self, d, ctx, own_friction)?;
        out.friction_factor = r.friction_factor;
        out.k_factor = Some(r.k_total);
        out.minor = k_loss(r.k_total, rho, v)?;
        Ok(out)
    }
}

impl Evaluate for Pump {
    fn evaluate(&self, flow: VolumeRate, ctx: &EvalContext<'_>) -> ComponentResult<LossOrGain> {
        let gain = pump_gain(self, ctx.fluid.density)?;
        let efficiency = self.efficiency.unwrap_or(ctx.pump_efficiency);
        let mut out = LossOrGain::new(&self.name, ElementKind::Pump, flow);
        out.gain = gain;
        out.shaft_power = Some(pump_power(gain, flow, efficiency)?);
        Ok(out)
    }
}

impl Evaluate for Equipment {
    fn evaluate(&self, flow: VolumeRate, ctx: &EvalContext<'_>) -> ComponentResult<LossOrGain> {
        let loss = self.loss.ok_or_else(|| {
            ComponentError::missing(format!("pressure drop for equipment '{}'", self.name))
        })?;
        let mut out = LossOrGain::new(&self.name, ElementKind::Equipment, flow);
        out.equipment = equipment_loss(loss, ctx.reference_pressure)?;
        Ok(out)
    }
}

struct Resistance {
    /// K for all units of the fitting.
    k_total: f64,
    /// Set when an equivalent length was converted with a friction factor.
    friction_factor: Option<f64>,
}

/// Fitting resistance by priority: explicit K, explicit equivalent length,
/// table K, table equivalent length. Scaled by quantity.
fn fitting_resistance<F>(
    fitting: &Fitting,
    diameter: Length,
    ctx: &EvalContext<'_>,
    mut friction: F,
) -> ComponentResult<Resistance>
where
    F: FnMut() -> ComponentResult<f64>,
{
    if fitting.quantity == 0 {
        return Err(ComponentError::NonPhysical {
            what: "fitting quantity must be at least 1",
        });
    }
    let qty = f64::from(fitting.quantity);

    let from_le = |le: Length, f: f64| -> ComponentResult<Resistance> {
        let le = check_positive(le.value, &fitting.name, "equivalent length")?;
        Ok(Resistance {
            k_total: qty * f * le / diameter.value,
            friction_factor: Some(f),
        })
    };

    if let Some(k) = fitting.k_factor {
        return Ok(Resistance {
            k_total: qty * k,
            friction_factor: None,
        });
    }
    if let Some(le) = fitting.equivalent_length {
        return from_le(le, friction()?);
    }
    let table = ctx.standards;
    if let Some(k) = table.k_factor(&fitting.fitting_type, Some(diameter)) {
        return Ok(Resistance {
            k_total: qty * k,
            friction_factor: None,
        });
    }
    if let Some(le) = table.equivalent_length(&fitting.fitting_type, Some(diameter)) {
        return from_le(le, friction()?);
    }
    Err(ComponentError::UnknownFitting {
        fitting_type: fitting.fitting_type.clone(),
    })
}

fn regime_advisory(out: &mut LossOrGain, re: f64, config: &FrictionConfig) {
    let message = match FlowRegime::classify(re, config) {
        FlowRegime::Laminar => format!(
            "laminar flow (Re = {re:.0} < {:.0})",
            config.laminar_limit
        ),
        FlowRegime::Transitional => format!(
            "transitional flow ({:.0} <= Re = {re:.0} < {:.0})",
            config.laminar_limit, config.turbulent_limit
        ),
        FlowRegime::Turbulent => return,
    };
    out.warnings.push(Warning::flow_regime(&out.name, message));
}

fn velocity_advisory(out: &mut LossOrGain, v: Velocity, ctx: &EvalContext<'_>) {
    if !ctx.velocity_check {
        return;
    }
    let (lo, hi) = ctx.standards.recommended_velocity(ctx.category);
    let speed = v.value.abs();
    let message = if speed < lo.value {
        format!(
            "velocity {speed:.3} m/s below recommended {:.2} m/s for {}",
            lo.value, ctx.category
        )
    } else if speed > hi.value {
        format!(
            "velocity {speed:.3} m/s above recommended {:.2} m/s for {}",
            hi.value, ctx.category
        )
    } else {
        return;
    };
    out.warnings.push(Warning::velocity(&out.name, message));
}
