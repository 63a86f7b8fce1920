//! Error types for solver operations.

use pf_components::ComponentError;
use pf_core::PfError;
use pf_graph::TopologyError;
use thiserror::Error;

/// Errors that abort a network calculation.
///
/// Iteration caps and unmet sizing targets are not errors; they surface as
/// [`pf_core::Warning`] values on the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Singular system: {what}")]
    Singular { what: String },

    #[error("Numeric error: {what}")]
    NumericalError { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SolverError::InvalidConfig { what: what.into() }
    }
}

impl From<PfError> for SolverError {
    fn from(e: PfError) -> Self {
        SolverError::Component(ComponentError::Core(e))
    }
}
