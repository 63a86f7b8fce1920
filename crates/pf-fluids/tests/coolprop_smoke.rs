//! CoolProp backend smoke tests.
//!
//! Wide tolerances keep these stable across backend versions; the point is
//! physical plausibility, not reference-grade values.

use pf_core::units::{k, pa};
use pf_fluids::{CoolPropFluid, FluidProperties, Species};

#[test]
fn water_at_1atm_293k() {
    let water = CoolPropFluid::new(Species::Water);
    let state = water.state(k(293.15), pa(101_325.0)).unwrap();

    assert!(
        state.density.value > 990.0 && state.density.value < 1005.0,
        "rho = {} kg/m³",
        state.density.value
    );
    // ~1.0 mPa·s
    assert!(
        state.viscosity.value > 0.8e-3 && state.viscosity.value < 1.2e-3,
        "mu = {} Pa·s",
        state.viscosity.value
    );
}

#[test]
fn water_viscosity_falls_with_temperature() {
    let water = CoolPropFluid::new(Species::Water);
    let p = pa(200_000.0);
    let cold = water.viscosity(k(283.15), p).unwrap();
    let warm = water.viscosity(k(333.15), p).unwrap();
    assert!(cold.value > warm.value);
}

#[test]
fn nitrogen_density_rises_with_pressure() {
    let n2 = CoolPropFluid::new(Species::Nitrogen);
    let t = k(300.0);
    let low = n2.density(t, pa(100_000.0)).unwrap();
    let high = n2.density(t, pa(500_000.0)).unwrap();
    assert!(high.value > 4.0 * low.value);
}

#[test]
fn rejects_non_physical_state() {
    let water = CoolPropFluid::new(Species::Water);
    assert!(water.density(k(-5.0), pa(101_325.0)).is_err());
    assert!(water.viscosity(k(293.15), pa(0.0)).is_err());
}
