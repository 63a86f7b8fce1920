//! Error types for the pf-app service layer.

use pf_components::ComponentError;
use pf_fluids::FluidError;
use pf_graph::TopologyError;
use pf_solver::SolverError;
use std::path::PathBuf;

/// Unified error for the engine and the project services.
///
/// Missing inputs, bad geometry and topology problems abort a run. Everything
/// recoverable comes back as a warning on the results instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required input: {what}")]
    MissingInput { what: String },

    #[error("Invalid geometry: {what} must be positive (got {value})")]
    InvalidGeometry { what: String, value: f64 },

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Engine has no bound configuration; call fit() first")]
    NotFitted,

    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("System not found: {0}")]
    SystemNotFound(String),

    #[error("Unsupported system layout: {message}")]
    Unsupported { message: String },

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ComponentError> for AppError {
    fn from(err: ComponentError) -> Self {
        match err {
            ComponentError::MissingInput { what } => AppError::MissingInput { what },
            ComponentError::InvalidGeometry {
                element,
                what,
                value,
            } => AppError::InvalidGeometry {
                what: format!("{element}: {what}"),
                value,
            },
            ComponentError::Fluid(e) => AppError::Fluid(e),
            other => AppError::Solver(other.to_string()),
        }
    }
}

impl From<SolverError> for AppError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Component(e) => e.into(),
            SolverError::Topology(e) => AppError::Topology(e),
            other => AppError::Solver(other.to_string()),
        }
    }
}

impl From<pf_project::ProjectError> for AppError {
    fn from(err: pf_project::ProjectError) -> Self {
        match err {
            pf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<pf_project::ValidationError> for AppError {
    fn from(err: pf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<pf_results::ResultsError> for AppError {
    fn from(err: pf_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
