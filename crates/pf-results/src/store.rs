//! Results storage: one pretty-printed JSON file per run.

use crate::types::PipelineResults;
use crate::{ResultsError, ResultsResult};
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct ResultsStore {
    root_dir: PathBuf,
}

impl ResultsStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// `.pipeflow/results` next to a project file.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "project path has no parent directory".to_string(),
            })?;
        Self::new(project_dir.join(".pipeflow").join("results"))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn run_path(&self, run_id: &str) -> ResultsResult<PathBuf> {
        if run_id.is_empty() || !run_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(ResultsError::InvalidPath {
                message: format!("'{run_id}' is not a valid run id"),
            });
        }
        Ok(self.root_dir.join(format!("{run_id}.json")))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_path(run_id).is_ok_and(|p| p.exists())
    }

    /// Write `results`, replacing any earlier run with the same id.
    pub fn save(&self, results: &PipelineResults) -> ResultsResult<PathBuf> {
        let path = self.run_path(&results.run_id)?;
        fs::write(&path, serde_json::to_string_pretty(results)?)?;
        Ok(path)
    }

    pub fn load(&self, run_id: &str) -> ResultsResult<PipelineResults> {
        let path = self.run_path(run_id)?;
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Every readable run, oldest first. Files that fail to parse are skipped.
    pub fn list(&self) -> ResultsResult<Vec<PipelineResults>> {
        let mut runs = Vec::new();
        if !self.root_dir.exists() {
            return Ok(runs);
        }
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path)
                && let Ok(results) = serde_json::from_str::<PipelineResults>(&content)
            {
                runs.push(results);
            }
        }
        runs.sort_by(|a, b| {
            match (parse_timestamp(&a.timestamp), parse_timestamp(&b.timestamp)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                _ => a.timestamp.cmp(&b.timestamp),
            }
            .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Ok(runs)
    }

    pub fn delete(&self, run_id: &str) -> ResultsResult<()> {
        let path = self.run_path(run_id)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn parse_timestamp(stamp: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(stamp).ok()
}

