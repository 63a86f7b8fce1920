//! Error types for element evaluation.

use pf_core::PfError;
use pf_fluids::FluidError;
use thiserror::Error;

/// Errors that abort an element calculation.
///
/// Recoverable outcomes (slow Colebrook convergence, out-of-band velocity)
/// are reported as `pf_core::Warning`s on the result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Missing required input: {what}")]
    MissingInput { what: String },

    #[error("Invalid geometry for '{element}': {what} must be positive (got {value})")]
    InvalidGeometry {
        element: String,
        what: &'static str,
        value: f64,
    },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Unknown fitting type '{fitting_type}' with no K-factor or equivalent length")]
    UnknownFitting { fitting_type: String },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error(transparent)]
    Core(#[from] PfError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    pub fn missing(what: impl Into<String>) -> Self {
        ComponentError::MissingInput { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::InvalidGeometry {
            element: "P1".into(),
            what: "diameter",
            value: 0.0,
        };
        let text = err.to_string();
        assert!(text.contains("P1"));
        assert!(text.contains("diameter"));
    }

    #[test]
    fn error_conversion() {
        let err: ComponentError = FluidError::NonPhysical { what: "density" }.into();
        assert!(matches!(err, ComponentError::Fluid(_)));
        let err: ComponentError = PfError::InvalidArg { what: "x" }.into();
        assert!(matches!(err, ComponentError::Core(_)));
    }
}
