//! Run execution and caching service.

use pf_results::{PipelineResults, ResultsStore};
use std::path::Path;
use tracing::info;

use crate::compile::compile_system;
use crate::engine::PipelineEngine;
use crate::error::{AppError, AppResult};
use crate::project_service;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Return a stored run with the same id instead of solving again.
    pub use_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub system_id: &'a str,
    pub options: RunOptions,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub results: PipelineResults,
    pub loaded_from_cache: bool,
}

/// Execute a system from a project file, or load it from the project's
/// results store when an identical run is already there.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let project = project_service::load_project(request.project_path)?;
    let system = project_service::get_system(&project, request.system_id)?;

    let mut engine = PipelineEngine::default();
    engine.fit(compile_system(system)?)?;
    let run_id = engine
        .pending_run_id()
        .ok_or(AppError::NotFitted)?
        .to_string();

    let store = ResultsStore::for_project(request.project_path)?;
    if request.options.use_cache && store.has_run(&run_id) {
        let results = store.load(&run_id)?;
        info!(%run_id, system = request.system_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            results,
            loaded_from_cache: true,
        });
    }

    let results = engine.run_and_store(&store)?;
    Ok(RunResponse {
        run_id,
        results,
        loaded_from_cache: false,
    })
}

/// Stored runs of a project, most recent first.
pub fn list_runs(project_path: &Path) -> AppResult<Vec<PipelineResults>> {
    let store = ResultsStore::for_project(project_path)?;
    let mut runs = store.list()?;
    runs.reverse();
    Ok(runs)
}

pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<PipelineResults> {
    let store = ResultsStore::for_project(project_path)?;
    Ok(store.load(run_id)?)
}
