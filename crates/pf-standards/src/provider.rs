//! Standards lookup interface.

use pf_core::units::{Length, Velocity};
use pf_fluids::FluidCategory;

/// Reference data consumed by the engine.
///
/// Fitting keys are case-insensitive strings such as `"elbow_90"` or
/// `"gate_valve"`. Lookups that need a diameter return `None` without one.
pub trait StandardsProvider: Send + Sync {
    /// Loss coefficient K for a fitting, if the table defines one.
    fn k_factor(&self, fitting_type: &str, diameter: Option<Length>) -> Option<f64>;

    /// Equivalent straight-pipe length of a fitting at the given diameter.
    fn equivalent_length(&self, fitting_type: &str, diameter: Option<Length>) -> Option<Length>;

    /// Absolute roughness for a material. Unknown materials get a default.
    fn roughness(&self, material: &str) -> Length;

    /// Internal diameters available for sizing, ascending.
    fn standard_diameters(&self) -> Vec<Length>;

    /// Recommended `(min, max)` velocity for a fluid category.
    fn recommended_velocity(&self, category: FluidCategory) -> (Velocity, Velocity);

    /// Internal diameter for a nominal size and schedule, if tabulated.
    fn internal_diameter(&self, _nominal: Length, _schedule: Option<&str>) -> Option<Length> {
        None
    }

    /// Nominal size whose internal diameter matches `internal`, if tabulated.
    fn nominal_for_internal(&self, _internal: Length) -> Option<Length> {
        None
    }
}
