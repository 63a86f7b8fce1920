//! Darcy friction factor.
//!
//! Laminar flow uses the closed form `64/Re`. Everything from the laminar
//! limit upward solves Colebrook-White,
//!
//! ```text
//! 1/√f = -2 log10( ε/(3.7 D) + 2.51/(Re √f) )
//! ```
//!
//! by Newton iteration on `x = 1/√f`, started from the Swamee-Jain explicit
//! approximation. The transitional band is only used for advisories.

use crate::error::{ComponentError, ComponentResult};
use core::fmt;
use pf_core::units::Length;
use std::f64::consts::LN_10;

/// Iteration controls and regime limits for the friction factor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrictionConfig {
    /// Stop when successive estimates of `f` differ by less than this.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Below this Reynolds number flow is laminar.
    pub laminar_limit: f64,
    /// At or above this Reynolds number flow is fully turbulent.
    pub turbulent_limit: f64,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            laminar_limit: 2300.0,
            turbulent_limit: 4000.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowRegime {
    Laminar,
    Transitional,
    Turbulent,
}

impl FlowRegime {
    pub fn classify(reynolds: f64, config: &FrictionConfig) -> Self {
        if reynolds < config.laminar_limit {
            FlowRegime::Laminar
        } else if reynolds < config.turbulent_limit {
            FlowRegime::Transitional
        } else {
            FlowRegime::Turbulent
        }
    }
}

impl fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowRegime::Laminar => "laminar",
            FlowRegime::Transitional => "transitional",
            FlowRegime::Turbulent => "turbulent",
        })
    }
}

/// Friction factor and how it was obtained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionFactor {
    pub value: f64,
    /// Newton steps taken; zero for the laminar closed form.
    pub iterations: usize,
    /// False when the iteration cap was hit. `value` is then the best estimate.
    pub converged: bool,
    pub regime: FlowRegime,
}

/// Darcy friction factor for a given Reynolds number and pipe.
///
/// Non-convergence is not an error: the last estimate is returned with
/// `converged == false` for the caller to flag.
pub fn friction_factor(
    reynolds: f64,
    diameter: Length,
    roughness: Length,
    config: &FrictionConfig,
) -> ComponentResult<FrictionFactor> {
    if !reynolds.is_finite() || reynolds <= 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "Reynolds number must be positive and finite",
        });
    }
    let d = diameter.value;
    if !d.is_finite() || d <= 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "diameter must be positive for the friction factor",
        });
    }
    let eps = roughness.value;
    if !eps.is_finite() || eps < 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "roughness must be non-negative",
        });
    }

    let regime = FlowRegime::classify(reynolds, config);
    if regime == FlowRegime::Laminar {
        return Ok(FrictionFactor {
            value: 64.0 / reynolds,
            iterations: 0,
            converged: true,
            regime,
        });
    }

    let (value, iterations, converged) = colebrook(reynolds, eps / d, config);
    Ok(FrictionFactor {
        value,
        iterations,
        converged,
        regime,
    })
}

/// Swamee-Jain explicit approximation to Colebrook-White.
pub fn swamee_jain(reynolds: f64, relative_roughness: f64) -> f64 {
    let a = relative_roughness / 3.7;
    let b = 5.74 / reynolds.powf(0.9);
    0.25 / (a + b).log10().powi(2)
}

/// Colebrook-White residual in `1/√f` form. Zero at the solution.
pub fn colebrook_residual(f: f64, reynolds: f64, relative_roughness: f64) -> f64 {
    let x = 1.0 / f.sqrt();
    x + 2.0 * (relative_roughness / 3.7 + 2.51 * x / reynolds).log10()
}

fn colebrook(reynolds: f64, relative_roughness: f64, config: &FrictionConfig) -> (f64, usize, bool) {
    let a = relative_roughness / 3.7;
    let b = 2.51 / reynolds;

    let mut f = swamee_jain(reynolds, relative_roughness);
    let mut x = 1.0 / f.sqrt();

    for iter in 1..=config.max_iterations {
        let arg = a + b * x;
        let g = x + 2.0 * arg.log10();
        let dg = 1.0 + 2.0 * b / (arg * LN_10);
        let mut next = x - g / dg;
        if !next.is_finite() || next <= 0.0 {
            next = 0.5 * x;
        }
        x = next;

        let f_next = 1.0 / (x * x);
        let delta = (f_next - f).abs();
        f = f_next;
        if delta < config.tolerance {
            return (f, iter, true);
        }
    }
    (f, config.max_iterations, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{inch, m, mm};
    use proptest::prelude::*;

    #[test]
    fn laminar_is_closed_form() {
        let ff = friction_factor(1000.0, m(0.05), mm(0.045), &FrictionConfig::default()).unwrap();
        assert_eq!(ff.value, 64.0 / 1000.0);
        assert_eq!(ff.iterations, 0);
        assert_eq!(ff.regime, FlowRegime::Laminar);
    }

    #[test]
    fn smooth_large_pipe() {
        // 15.25 in line carrying 3000 gal/min of water.
        let ff = friction_factor(620_899.0, inch(15.25), m(0.0), &FrictionConfig::default())
            .unwrap();
        assert!(ff.converged);
        assert!((ff.value - 0.01266).abs() < 2e-4, "f = {}", ff.value);
    }

    #[test]
    fn roughness_raises_friction() {
        let cfg = FrictionConfig::default();
        let smooth = friction_factor(620_899.0, inch(15.25), m(0.0), &cfg).unwrap();
        let rough = friction_factor(620_899.0, inch(15.25), inch(0.002), &cfg).unwrap();
        assert!(rough.value > smooth.value);
    }

    #[test]
    fn iteration_cap_returns_best_estimate() {
        let cfg = FrictionConfig {
            tolerance: 0.0,
            max_iterations: 3,
            ..FrictionConfig::default()
        };
        let ff = friction_factor(1e5, m(0.1), mm(0.045), &cfg).unwrap();
        assert!(!ff.converged);
        assert_eq!(ff.iterations, 3);
        assert!(colebrook_residual(ff.value, 1e5, 0.045e-3 / 0.1).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_positive_reynolds() {
        let cfg = FrictionConfig::default();
        assert!(friction_factor(0.0, m(0.1), mm(0.045), &cfg).is_err());
        assert!(friction_factor(-5.0, m(0.1), mm(0.045), &cfg).is_err());
        assert!(friction_factor(f64::NAN, m(0.1), mm(0.045), &cfg).is_err());
    }

    #[test]
    fn regime_bands() {
        let cfg = FrictionConfig::default();
        assert_eq!(FlowRegime::classify(2299.9, &cfg), FlowRegime::Laminar);
        assert_eq!(FlowRegime::classify(2300.0, &cfg), FlowRegime::Transitional);
        assert_eq!(FlowRegime::classify(4000.0, &cfg), FlowRegime::Turbulent);
    }

    proptest! {
        #[test]
        fn laminar_identity(re in 1.0e-3f64..2299.999) {
            let ff = friction_factor(re, m(0.1), mm(0.045), &FrictionConfig::default()).unwrap();
            prop_assert_eq!(ff.value, 64.0 / re);
        }

        #[test]
        fn colebrook_round_trip(
            re in 2300.0f64..1.0e8,
            rel in 0.0f64..0.05,
        ) {
            let d = 0.1;
            let ff = friction_factor(re, m(d), m(rel * d), &FrictionConfig::default()).unwrap();
            prop_assert!(ff.converged);
            prop_assert!(ff.value > 0.0);
            let r = colebrook_residual(ff.value, re, rel);
            prop_assert!(r.abs() < 1e-6, "residual {} at Re={} e/D={}", r, re, rel);
        }
    }
}
