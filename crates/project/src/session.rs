use std::path::Path;

use crate::error::ProjectError;
use crate::project::Project;
use crate::store::ProjectStore;

/// Which project a single user action operates on.
#[derive(Debug, Clone, Default)]
pub struct Session {
    project: Option<Project>,
}

impl Session {
    /// An empty or missing selection yields a session without a project.
    pub fn new(store: &ProjectStore, selected: Option<&str>) -> Result<Self, ProjectError> {
        let project = match selected {
            Some(name) if !name.is_empty() => Some(store.project(name)?),
            _ => None,
        };
        Ok(Self { project })
    }

    pub fn with_project(project: Project) -> Self {
        Self {
            project: Some(project),
        }
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn require_project(&self) -> Result<&Project, ProjectError> {
        self.project.as_ref().ok_or(ProjectError::NoProjectSelected)
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.project.as_ref().map(|p| p.dir())
    }
}
