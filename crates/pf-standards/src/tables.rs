//! Built-in standards provider.

use crate::fittings::{FittingResistance, fitting_resistance};
use crate::materials::material_roughness;
use crate::provider::StandardsProvider;
use crate::sizes::{Schedule, pipe_sizes};
use crate::velocity::recommended_velocity_mps;
use pf_core::units::{Length, Velocity, inch, m, mm, mps};
use pf_fluids::FluidCategory;

/// Nominal sizes compare in inches; anything closer than this is the same size.
const NOMINAL_MATCH_IN: f64 = 0.01;

#[derive(Clone, Debug, Default)]
pub struct StandardTables {
    /// Schedule used for sizing and for nominal lookups without one.
    pub schedule: Schedule,
}

impl StandardTables {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }
}

impl StandardsProvider for StandardTables {
    fn k_factor(&self, fitting_type: &str, _diameter: Option<Length>) -> Option<f64> {
        match fitting_resistance(fitting_type)? {
            FittingResistance::K(k) => Some(k),
            FittingResistance::LOverD(_) => None,
        }
    }

    fn equivalent_length(&self, fitting_type: &str, diameter: Option<Length>) -> Option<Length> {
        match fitting_resistance(fitting_type)? {
            FittingResistance::LOverD(l_over_d) => diameter.map(|d| d * l_over_d),
            FittingResistance::K(_) => None,
        }
    }

    fn roughness(&self, material: &str) -> Length {
        mm(material_roughness(material).0)
    }

    fn standard_diameters(&self) -> Vec<Length> {
        pipe_sizes(self.schedule).map(|s| mm(s.internal_mm)).collect()
    }

    fn recommended_velocity(&self, category: FluidCategory) -> (Velocity, Velocity) {
        let (lo, hi) = recommended_velocity_mps(category);
        (mps(lo), mps(hi))
    }

    fn internal_diameter(&self, nominal: Length, schedule: Option<&str>) -> Option<Length> {
        let schedule = match schedule {
            Some(s) => s.parse().ok()?,
            None => self.schedule,
        };
        let nominal_in = nominal.value / inch(1.0).value;
        pipe_sizes(schedule)
            .find(|s| (s.nominal_in - nominal_in).abs() < NOMINAL_MATCH_IN)
            .map(|s| mm(s.internal_mm))
    }

    fn nominal_for_internal(&self, internal: Length) -> Option<Length> {
        pipe_sizes(self.schedule)
            .find(|s| (mm(s.internal_mm).value - internal.value).abs() < m(1e-6).value)
            .map(|s| inch(s.nominal_in))
    }
}
