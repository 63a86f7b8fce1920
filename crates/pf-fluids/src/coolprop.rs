//! CoolProp-backed property provider.

use crate::error::{FluidError, FluidResult};
use crate::model::{FluidProperties, FluidState, validation};
use crate::species::Species;
use pf_core::units::{Density, DynVisc, Pressure, Temperature, kgpm3, pas};
use rfluids::prelude::*;

/// Real-fluid properties for a pure species.
///
/// rfluids `Fluid` instances carry no shared state, so one is built per query.
#[derive(Clone, Debug)]
pub struct CoolPropFluid {
    species: Species,
}

impl CoolPropFluid {
    pub fn new(species: Species) -> Self {
        Self { species }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    fn fluid_at_pt(&self, p_pa: f64, t_k: f64) -> FluidResult<Fluid> {
        Fluid::from(self.species.rfluids_pure())
            .in_state(FluidInput::pressure(p_pa), FluidInput::temperature(t_k))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at P={} Pa, T={} K: {}", p_pa, t_k, e),
            })
    }
}

impl FluidProperties for CoolPropFluid {
    fn name(&self) -> &str {
        self.species.key()
    }

    fn density(&self, t: Temperature, p: Pressure) -> FluidResult<Density> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        let mut fluid = self.fluid_at_pt(p.value, t.value)?;
        let rho = fluid.density().map_err(|e| FluidError::Backend {
            message: format!("rfluids error getting density: {}", e),
        })?;
        let rho = kgpm3(rho);
        validation::validate_density(rho)?;
        Ok(rho)
    }

    fn viscosity(&self, t: Temperature, p: Pressure) -> FluidResult<DynVisc> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        let mut fluid = self.fluid_at_pt(p.value, t.value)?;
        let mu = fluid.dynamic_viscosity().map_err(|e| FluidError::Backend {
            message: format!("rfluids error getting viscosity: {}", e),
        })?;
        let mu = pas(mu);
        validation::validate_viscosity(mu)?;
        Ok(mu)
    }

    fn state(&self, t: Temperature, p: Pressure) -> FluidResult<FluidState> {
        validation::validate_temperature(t)?;
        validation::validate_pressure(p)?;
        let mut fluid = self.fluid_at_pt(p.value, t.value)?;
        let rho = fluid.density().map_err(|e| FluidError::Backend {
            message: format!("rfluids error getting density: {}", e),
        })?;
        let mu = fluid.dynamic_viscosity().map_err(|e| FluidError::Backend {
            message: format!("rfluids error getting viscosity: {}", e),
        })?;
        FluidState::new(kgpm3(rho), pas(mu))
    }
}
