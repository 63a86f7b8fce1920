//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Project;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files are unversioned drafts with the same layout.
fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    project.version = 1;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_is_stamped_with_latest_version() {
        let project = Project {
            version: 0,
            name: "draft".to_string(),
            systems: vec![],
        };
        let migrated = migrate_to_latest(project).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
    }

    #[test]
    fn current_version_is_untouched() {
        let project = Project {
            version: LATEST_VERSION,
            name: "current".to_string(),
            systems: vec![],
        };
        assert_eq!(migrate_to_latest(project.clone()).unwrap(), project);
    }
}
