//! Recommended line velocities by service.

use pf_fluids::FluidCategory;

/// `(min, max)` in m/s.
pub fn recommended_velocity_mps(category: FluidCategory) -> (f64, f64) {
    match category {
        FluidCategory::Water => (1.0, 2.5),
        FluidCategory::OrganicLiquid => (1.0, 3.0),
        FluidCategory::ViscousLiquid => (0.5, 1.5),
        FluidCategory::Gas => (10.0, 30.0),
        FluidCategory::Steam => (15.0, 40.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_ordered() {
        for cat in FluidCategory::ALL {
            let (lo, hi) = recommended_velocity_mps(cat);
            assert!(0.0 < lo && lo < hi, "{cat}");
        }
    }
}
