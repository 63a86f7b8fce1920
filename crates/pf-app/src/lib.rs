//! Application layer for pipeflow.
//!
//! [`PipelineEngine`] is the entry point: `fit` binds a fluid, a flow and a
//! topology, `run` sizes and evaluates them, `summary` reports the last run.
//! The project and run services drive the engine from project files and
//! cache results next to them.

pub mod compile;
pub mod config;
pub mod engine;
pub mod error;
pub mod project_service;
pub mod run_service;

mod report;

pub use compile::{compile_fluid, compile_network, compile_solver, compile_system};
pub use config::{EngineConfig, FlowSpec, FluidSpec, Topology};
pub use engine::{PipelineEngine, SOLVER_VERSION};
pub use error::{AppError, AppResult};
pub use project_service::{
    SystemSummary, get_system, list_systems, load_project, save_project, validate_project,
};
pub use run_service::{RunOptions, RunRequest, RunResponse, ensure_run, list_runs, load_run};
