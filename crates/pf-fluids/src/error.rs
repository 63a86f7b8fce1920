//! Fluid property errors.

use pf_core::PfError;
use thiserror::Error;

pub type FluidResult<T> = Result<T, FluidError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, viscosity, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Species has no backend mapping.
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<FluidError> for PfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => PfError::Invariant { what },
            FluidError::InvalidArg { what } => PfError::InvalidArg { what },
            FluidError::NotSupported { what } => PfError::InvalidArg { what },
            FluidError::Backend { .. } => PfError::Invariant {
                what: "fluid backend failure",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "viscosity" };
        assert!(err.to_string().contains("viscosity"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }

    #[test]
    fn error_to_pf_error() {
        let pf: PfError = FluidError::InvalidArg { what: "temperature" }.into();
        assert!(matches!(pf, PfError::InvalidArg { what: "temperature" }));
    }
}
