//! pf-standards: engineering reference data for pipe sizing.
//!
//! Provides:
//! - [`StandardsProvider`], the lookup interface the hydraulic engine consumes
//! - [`StandardTables`], built-in tables (Crane-style fitting resistances,
//!   material roughness, Schedule 40/80 internal diameters, velocity bands)
//! - [`PipeCostModel`], installed cost per metre by material and nominal size

pub mod cost;
pub mod fittings;
pub mod materials;
pub mod provider;
pub mod sizes;
pub mod tables;
pub mod velocity;

pub use cost::PipeCostModel;
pub use fittings::{FittingResistance, fitting_resistance, fitting_types};
pub use materials::material_roughness;
pub use provider::StandardsProvider;
pub use sizes::{PipeSize, Schedule, pipe_sizes};
pub use tables::StandardTables;
pub use velocity::recommended_velocity_mps;
