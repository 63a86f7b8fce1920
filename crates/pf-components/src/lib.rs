//! pf-components: element physics for pipeflow.
//!
//! Provides:
//! - Hydraulic relations (velocity, Reynolds number, Darcy and local losses,
//!   elevation, pump gain, equipment drop, economic diameter)
//! - The Darcy friction factor (laminar closed form, Colebrook-White)
//! - Per-element evaluation into a [`LossOrGain`] record
//!
//! All calculations are deterministic functions of the element, the flow and
//! an [`EvalContext`], suitable for parallel branch evaluation.
//!
//! # Example
//!
//! ```
//! use pf_components::{EvalContext, Evaluate};
//! use pf_core::units::{kgpm3, lps, m, mm, pas};
//! use pf_fluids::FluidState;
//! use pf_graph::Pipe;
//! use pf_standards::StandardTables;
//!
//! let water = FluidState::new(kgpm3(998.0), pas(1.0e-3)).unwrap();
//! let tables = StandardTables::default();
//! let ctx = EvalContext::new(water, &tables);
//!
//! let pipe = Pipe::new("P-1").with_internal_diameter(mm(100.0)).with_length(m(30.0));
//! let r = pipe.evaluate(lps(12.0), &ctx).unwrap();
//! assert!(r.pressure_drop().value > 0.0);
//! ```

pub mod common;
pub mod element;
pub mod error;
pub mod friction;
pub mod physics;

// Re-exports
pub use element::{
    DEFAULT_PUMP_EFFICIENCY, EvalContext, Evaluate, LossOrGain, Upstream, evaluate_element,
    pipe_roughness, resolve_diameter,
};
pub use error::{ComponentError, ComponentResult};
pub use friction::{FlowRegime, FrictionConfig, FrictionFactor, colebrook_residual, friction_factor};
