//! Project loading, saving, validation, and introspection.

use pf_project::schema::{ElementDef, Project, SystemDef, TopologyDef};
use pf_results::RunMode;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Summary of a system for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSummary {
    pub id: String,
    pub name: String,
    pub mode: RunMode,
    /// Leaves, nested networks flattened.
    pub element_count: usize,
    /// Pipes without a diameter, left to the optimizer.
    pub unsized_pipes: usize,
}

/// Load a project file. `.json` is read as JSON, anything else as YAML.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let project = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => pf_project::parse_json(&content)?,
        _ => pf_project::parse_yaml(&content)?,
    };
    Ok(project)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => pf_project::save_json(path, project)?,
        _ => pf_project::save_yaml(path, project)?,
    }
    Ok(())
}

/// Schema-level validation plus the requirement that there is something to run.
pub fn validate_project(project: &Project) -> AppResult<()> {
    if project.systems.is_empty() {
        return Err(AppError::Validation(
            "Project must have at least one system".to_string(),
        ));
    }
    pf_project::validate_project(project)?;
    Ok(())
}

pub fn list_systems(project: &Project) -> Vec<SystemSummary> {
    project
        .systems
        .iter()
        .map(|system| {
            let (mode, leaves) = match &system.topology {
                TopologyDef::Pipe(p) => (RunMode::SinglePipe, vec![ElementDef::Pipe(p.clone())]),
                TopologyDef::Chain { elements } => (RunMode::Chain, elements.clone()),
                TopologyDef::Network(n) => (RunMode::Network, n.elements.clone()),
            };
            let mut counts = (0, 0);
            count_leaves(&leaves, &mut counts);
            SystemSummary {
                id: system.id.clone(),
                name: system.name.clone(),
                mode,
                element_count: counts.0,
                unsized_pipes: counts.1,
            }
        })
        .collect()
}

fn count_leaves(elements: &[ElementDef], counts: &mut (usize, usize)) {
    for element in elements {
        match element {
            ElementDef::Network(n) => count_leaves(&n.elements, counts),
            ElementDef::Pipe(p) => {
                counts.0 += 1;
                if p.internal_diameter_m.is_none() && p.nominal_diameter_m.is_none() {
                    counts.1 += 1;
                }
            }
            _ => counts.0 += 1,
        }
    }
}

pub fn get_system<'a>(project: &'a Project, system_id: &str) -> AppResult<&'a SystemDef> {
    project
        .system(system_id)
        .ok_or_else(|| AppError::SystemNotFound(system_id.to_string()))
}
