//! Solver configuration.

use crate::error::{SolverError, SolverResult};
use pf_components::{DEFAULT_PUMP_EFFICIENCY, EvalContext, FrictionConfig};
use pf_core::units::{Length, m};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balancer used for parallel blocks.
///
/// Node-and-edge networks with loops always use Hardy-Cross.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMethod {
    /// Parallel resolver for parallel blocks, Hardy-Cross for looped graphs.
    #[default]
    Auto,
    ParallelResolver,
    HardyCross,
    Matrix,
    /// Resolver and matrix balancer both; the smaller final spread wins.
    Dual,
}

impl fmt::Display for NetworkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NetworkMethod::Auto => "auto",
            NetworkMethod::ParallelResolver => "parallel resolver",
            NetworkMethod::HardyCross => "hardy-cross",
            NetworkMethod::Matrix => "matrix",
            NetworkMethod::Dual => "dual",
        })
    }
}

/// Immutable settings passed into every solver call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: NetworkMethod,
    /// Cap for the parallel resolver and matrix balancer.
    pub max_iterations: usize,
    pub hardy_cross_max_iterations: usize,
    /// Loop correction tolerance in m³/s.
    pub flow_tolerance: f64,
    /// Allowed spread of branch pressure drops in Pa.
    pub pressure_tolerance: f64,
    pub friction: FrictionConfig,
    /// Exponent `n` of the loss law `ΔP ∝ Qⁿ`.
    pub loss_exponent: f64,
    pub pump_efficiency: f64,
    pub default_length: Length,
    pub default_diameter: Option<Length>,
    pub velocity_check: bool,
    /// Evaluate parallel branches on the rayon pool.
    pub parallel_branches: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: NetworkMethod::Auto,
            max_iterations: 100,
            hardy_cross_max_iterations: 200,
            flow_tolerance: 1e-6,
            pressure_tolerance: 1.0,
            friction: FrictionConfig::default(),
            loss_exponent: 2.0,
            pump_efficiency: DEFAULT_PUMP_EFFICIENCY,
            default_length: m(1.0),
            default_diameter: None,
            velocity_check: true,
            parallel_branches: false,
        }
    }
}

impl SolverConfig {
    pub fn with_method(mut self, method: NetworkMethod) -> Self {
        self.method = method;
        self
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.max_iterations == 0 || self.hardy_cross_max_iterations == 0 {
            return Err(SolverError::config("iteration caps must be at least 1"));
        }
        positive(self.flow_tolerance, "flow_tolerance")?;
        positive(self.pressure_tolerance, "pressure_tolerance")?;
        positive(self.friction.tolerance, "friction.tolerance")?;
        if self.friction.max_iterations == 0 {
            return Err(SolverError::config("friction.max_iterations must be at least 1"));
        }
        if self.friction.laminar_limit > self.friction.turbulent_limit {
            return Err(SolverError::config(
                "friction.laminar_limit must not exceed friction.turbulent_limit",
            ));
        }
        positive(self.loss_exponent, "loss_exponent")?;
        if !(self.pump_efficiency > 0.0 && self.pump_efficiency <= 1.0) {
            return Err(SolverError::config("pump_efficiency must be in (0, 1]"));
        }
        positive(self.default_length.value, "default_length")?;
        if let Some(d) = self.default_diameter {
            positive(d.value, "default_diameter")?;
        }
        Ok(())
    }

    /// Copy the element-level settings into an evaluation context.
    pub fn apply<'a>(&self, mut ctx: EvalContext<'a>) -> EvalContext<'a> {
        ctx.friction = self.friction;
        ctx.pump_efficiency = self.pump_efficiency;
        ctx.default_length = self.default_length;
        ctx.default_diameter = self.default_diameter;
        ctx.velocity_check = self.velocity_check;
        ctx
    }
}

fn positive(value: f64, what: &str) -> SolverResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SolverError::config(format!("{what} must be positive, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SolverConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.hardy_cross_max_iterations, 200);
        assert_eq!(cfg.loss_exponent, 2.0);
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = SolverConfig {
            pressure_tolerance: 0.0,
            ..SolverConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SolverError::InvalidConfig { .. })));

        let cfg = SolverConfig {
            pump_efficiency: 1.5,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SolverConfig =
            serde_json::from_str(r#"{"method": "hardy_cross", "max_iterations": 40}"#).unwrap();
        assert_eq!(cfg.method, NetworkMethod::HardyCross);
        assert_eq!(cfg.max_iterations, 40);
        assert_eq!(cfg.pressure_tolerance, 1.0);
        assert!(cfg.velocity_check);
    }
}
