//! Constant-property fluid.

use crate::error::FluidResult;
use crate::model::{FluidProperties, FluidState};
use pf_core::units::{Density, DynVisc, Pressure, Temperature};

/// Fluid with fixed density and viscosity, independent of state.
///
/// This is the common case for liquid line sizing where the designer supplies
/// ρ and μ directly.
#[derive(Clone, Debug)]
pub struct ConstantFluid {
    name: String,
    state: FluidState,
}

impl ConstantFluid {
    pub fn new(name: impl Into<String>, density: Density, viscosity: DynVisc) -> FluidResult<Self> {
        Ok(Self {
            name: name.into(),
            state: FluidState::new(density, viscosity)?,
        })
    }

    pub fn from_state(name: impl Into<String>, state: FluidState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    /// Water near 20 °C.
    pub fn water() -> Self {
        Self::from_state(
            "water",
            FluidState {
                density: pf_core::units::kgpm3(998.2),
                viscosity: pf_core::units::cp(1.002),
            },
        )
    }
}

impl FluidProperties for ConstantFluid {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self, _t: Temperature, _p: Pressure) -> FluidResult<Density> {
        Ok(self.state.density)
    }

    fn viscosity(&self, _t: Temperature, _p: Pressure) -> FluidResult<DynVisc> {
        Ok(self.state.viscosity)
    }
}
