//! pf-fluids: fluid property providers for pipeflow.
//!
//! The hydraulic engine only ever asks two questions of a fluid: its density
//! and its dynamic viscosity at a given temperature and pressure. This crate
//! answers them through the [`FluidProperties`] trait, with a constant-property
//! model for design work and a CoolProp backend (via `rfluids`) for real fluids.
//!
//! # Example
//!
//! ```no_run
//! use pf_core::units::{k, pa};
//! use pf_fluids::{CoolPropFluid, FluidProperties, Species};
//!
//! let water = CoolPropFluid::new(Species::Water);
//! let rho = water.density(k(293.15), pa(101_325.0)).unwrap();
//! println!("Density: {} kg/m³", rho.value);
//! ```

pub mod category;
pub mod constant;
pub mod coolprop;
pub mod error;
pub mod model;
pub mod species;

pub use category::FluidCategory;
pub use constant::ConstantFluid;
pub use coolprop::CoolPropFluid;
pub use error::{FluidError, FluidResult};
pub use model::{FluidProperties, FluidState};
pub use species::Species;
