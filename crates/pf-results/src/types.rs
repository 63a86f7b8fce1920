//! Result data types.
//!
//! Everything is stored in SI base units with the unit in the field name, so
//! saved runs read the same regardless of the units the inputs came in.

use pf_core::Warning;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type RunId = String;

/// What the engine evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    SinglePipe,
    Chain,
    Network,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunMode::SinglePipe => "single pipe",
            RunMode::Chain => "chain",
            RunMode::Network => "network",
        })
    }
}

/// One leaf element at its solved flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementReport {
    pub name: String,
    /// `pipe`, `fitting`, `pump` or `equipment`.
    pub kind: String,
    pub flow_m3_s: f64,
    pub diameter_m: Option<f64>,
    pub length_m: Option<f64>,
    pub velocity_m_s: Option<f64>,
    pub reynolds: Option<f64>,
    pub friction_factor: Option<f64>,
    pub k_factor: Option<f64>,
    pub major_loss_pa: f64,
    pub minor_loss_pa: f64,
    pub elevation_loss_pa: f64,
    pub equipment_loss_pa: f64,
    pub pump_gain_pa: f64,
    /// Net inlet-to-outlet drop; negative across a pump.
    pub pressure_drop_pa: f64,
    pub shaft_power_w: Option<f64>,
}

impl ElementReport {
    pub fn is_pipe(&self) -> bool {
        self.kind == "pipe"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    pub name: String,
    pub pressure_pa: f64,
    pub flow_m3_s: f64,
}

/// Final state of one balanced parallel block or looped graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub block: String,
    pub method: String,
    pub flows_m3_s: Vec<f64>,
    pub drops_pa: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub spread_pa: f64,
}

/// A diameter chosen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingReport {
    pub pipe: String,
    pub target: String,
    pub diameter_m: f64,
    pub nominal_m: Option<f64>,
    pub met_target: bool,
}

/// Aggregate figures of a run.
///
/// Velocity, Reynolds number and friction factor come from the single pipe,
/// or from the fastest pipe when several are evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub mode: RunMode,
    pub flow_m3_s: f64,
    pub pressure_drop_pa: f64,
    pub head_loss_m: f64,
    /// Shaft power to overcome the net loss at the configured efficiency.
    pub required_power_w: f64,
    /// Shaft power drawn by the pumps in the system.
    pub pump_power_w: f64,
    pub velocity_m_s: Option<f64>,
    pub reynolds: Option<f64>,
    pub friction_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe_cost: Option<f64>,
    pub converged: bool,
    pub warning_count: usize,
}

/// Summary plus the per-element rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSummary {
    pub summary: ResultsSummary,
    pub elements: Vec<ElementReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Immutable snapshot of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResults {
    pub run_id: RunId,
    /// RFC 3339.
    pub timestamp: String,
    pub solver_version: String,
    pub summary: ResultsSummary,
    pub elements: Vec<ElementReport>,
    #[serde(default)]
    pub nodes: Vec<NodeReport>,
    #[serde(default)]
    pub balances: Vec<BalanceReport>,
    #[serde(default)]
    pub sizing: Vec<SizingReport>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

impl PipelineResults {
    pub fn summary(&self) -> &ResultsSummary {
        &self.summary
    }

    pub fn detailed_summary(&self) -> DetailedSummary {
        DetailedSummary {
            summary: self.summary.clone(),
            elements: self.elements.clone(),
            nodes: self.nodes.clone(),
            warnings: self.warnings.clone(),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.summary.mode
    }

    pub fn element(&self, name: &str) -> Option<&ElementReport> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn pipes(&self) -> impl Iterator<Item = &ElementReport> {
        self.elements.iter().filter(|e| e.is_pipe())
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl fmt::Display for PipelineResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "=== Pipeline Summary ({}) ===", s.mode)?;
        writeln!(f, "Flow: {:.5} m3/s", s.flow_m3_s)?;
        writeln!(f, "Total Pressure Drop: {:.2} Pa", s.pressure_drop_pa)?;
        writeln!(f, "Head Loss: {:.3} m", s.head_loss_m)?;
        if s.pump_power_w > 0.0 {
            writeln!(f, "Pump Shaft Power: {:.1} W", s.pump_power_w)?;
        }
        if s.required_power_w > 0.0 {
            writeln!(f, "Required Power: {:.1} W", s.required_power_w)?;
        }
        if let Some(cost) = s.pipe_cost {
            writeln!(f, "Pipe Cost: {cost:.2}")?;
        }

        if !self.elements.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Element Details ---")?;
        }
        for e in &self.elements {
            writeln!(f, "{} ({})", e.name, e.kind)?;
            if let Some(d) = e.diameter_m {
                writeln!(f, "  Diameter: {:.2} mm", d * 1000.0)?;
            }
            if let Some(v) = e.velocity_m_s {
                writeln!(f, "  Velocity: {v:.3} m/s")?;
            }
            if let Some(re) = e.reynolds {
                writeln!(f, "  Reynolds #: {re:.0}")?;
            }
            if let Some(ff) = e.friction_factor {
                writeln!(f, "  Friction Factor: {ff:.4}")?;
            }
            if let Some(k) = e.k_factor {
                writeln!(f, "  K-factor: {k:.3}")?;
            }
            writeln!(f, "  Pressure Drop: {:.2} Pa", e.pressure_drop_pa)?;
        }

        if !self.nodes.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Nodes ---")?;
            for n in &self.nodes {
                writeln!(f, "{}: {:.2} Pa, {:.5} m3/s", n.name, n.pressure_pa, n.flow_m3_s)?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Warnings ---")?;
            for w in &self.warnings {
                writeln!(f, "{w}")?;
            }
        }
        Ok(())
    }
}
