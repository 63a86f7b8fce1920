//! Conversion of solver records into stored result rows.

use pf_components::LossOrGain;
use pf_results::{BalanceReport, ElementReport, NodeReport, SizingReport};
use pf_solver::{BalanceRecord, NodeState, SizingOutcome, SizingTarget};

pub(crate) fn element_report(e: &LossOrGain) -> ElementReport {
    ElementReport {
        name: e.name.clone(),
        kind: e.kind.to_string(),
        flow_m3_s: e.flow.value,
        diameter_m: e.diameter.map(|d| d.value),
        length_m: e.length.map(|l| l.value),
        velocity_m_s: e.velocity.map(|v| v.value),
        reynolds: e.reynolds,
        friction_factor: e.friction_factor,
        k_factor: e.k_factor,
        major_loss_pa: e.major.value,
        minor_loss_pa: e.minor.value,
        elevation_loss_pa: e.elevation.value,
        equipment_loss_pa: e.equipment.value,
        pump_gain_pa: e.gain.value,
        pressure_drop_pa: e.pressure_drop().value,
        shaft_power_w: e.shaft_power.map(|p| p.value),
    }
}

pub(crate) fn node_report(n: &NodeState) -> NodeReport {
    NodeReport {
        name: n.name.clone(),
        pressure_pa: n.pressure.value,
        flow_m3_s: n.flow.value,
    }
}

pub(crate) fn balance_report(b: &BalanceRecord) -> BalanceReport {
    BalanceReport {
        block: b.block.clone(),
        method: b.method.to_string(),
        flows_m3_s: b.flows.clone(),
        drops_pa: b.drops.clone(),
        iterations: b.iterations,
        converged: b.converged,
        spread_pa: b.spread,
    }
}

pub(crate) fn sizing_report(s: &SizingOutcome) -> SizingReport {
    let target = match s.target {
        SizingTarget::Velocity => "velocity".to_string(),
        SizingTarget::PressureBudget(dp) => format!("pressure_budget({:.1} Pa)", dp.value),
        SizingTarget::Economic => "economic".to_string(),
    };
    SizingReport {
        pipe: s.evaluation.name.clone(),
        target,
        diameter_m: s.diameter.value,
        nominal_m: s.nominal.map(|n| n.value),
        met_target: s.met_target(),
    }
}
