//! Fluid property provider trait and validation helpers.

use crate::error::{FluidError, FluidResult};
use pf_core::units::{Density, DynVisc, KinVisc, Pressure, Temperature};

/// Density and viscosity resolved once for a calculation.
///
/// The engine assumes constant properties per call, so providers are queried
/// once and the solvers work from this snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidState {
    pub density: Density,
    pub viscosity: DynVisc,
}

impl FluidState {
    pub fn new(density: Density, viscosity: DynVisc) -> FluidResult<Self> {
        validation::validate_density(density)?;
        validation::validate_viscosity(viscosity)?;
        Ok(Self { density, viscosity })
    }

    /// Build from kinematic viscosity, ν = μ/ρ.
    pub fn from_kinematic(density: Density, nu: KinVisc) -> FluidResult<Self> {
        validation::validate_density(density)?;
        if !nu.value.is_finite() || nu.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "kinematic viscosity must be positive and finite",
            });
        }
        Self::new(density, nu * density)
    }

    pub fn kinematic_viscosity(&self) -> KinVisc {
        self.viscosity / self.density
    }
}

/// Property provider consumed by the hydraulic engine.
///
/// Implementations must be thread-safe so parallel branches can share one.
pub trait FluidProperties: Send + Sync {
    fn name(&self) -> &str;

    fn density(&self, t: Temperature, p: Pressure) -> FluidResult<Density>;

    /// Dynamic viscosity.
    fn viscosity(&self, t: Temperature, p: Pressure) -> FluidResult<DynVisc>;

    /// Both properties at one state.
    fn state(&self, t: Temperature, p: Pressure) -> FluidResult<FluidState> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        FluidState::new(self.density(t, p)?, self.viscosity(t, p)?)
    }
}

pub(crate) mod validation {
    use super::*;

    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_density(rho: Density) -> FluidResult<()> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_viscosity(mu: DynVisc) -> FluidResult<()> {
        if !mu.value.is_finite() || mu.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "viscosity must be positive and finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;
    use pf_core::units::{cp, k, kgpm3, m2ps, pa};

    #[test]
    fn validate_positive_pressure() {
        assert!(validate_pressure(pa(101325.0)).is_ok());
        assert!(validate_pressure(pa(-100.0)).is_err());
        assert!(validate_pressure(pa(0.0)).is_err());
        assert!(validate_pressure(pa(f64::NAN)).is_err());
    }

    #[test]
    fn validate_positive_temperature() {
        assert!(validate_temperature(k(300.0)).is_ok());
        assert!(validate_temperature(k(0.0)).is_err());
    }

    #[test]
    fn kinematic_round_trip() {
        let state = FluidState::from_kinematic(kgpm3(998.0), m2ps(1.0e-6)).unwrap();
        assert!((state.viscosity.value - 998.0e-6).abs() < 1e-12);
        assert!((state.kinematic_viscosity().value - 1.0e-6).abs() < 1e-15);
    }

    #[test]
    fn state_rejects_zero_viscosity() {
        assert!(FluidState::new(kgpm3(998.0), cp(0.0)).is_err());
    }
}
