use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{ProjectError, is_plain_component};
use crate::project::Project;

/// The directory that holds every project working directory.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the projects root if needed. Returns true when it was created.
    pub async fn ensure_root(&self) -> Result<bool, ProjectError> {
        if fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(false);
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ProjectError::io(&self.root, e))?;
        info!(root = ?self.root, "Created projects directory");
        Ok(true)
    }

    /// Sorted names of all project directories. Empty when the root does not exist yet.
    pub async fn list_projects(&self) -> Result<Vec<String>, ProjectError> {
        if !fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ProjectError::io(&self.root, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProjectError::io(&self.root, e))?
        {
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Resolve a project by name without touching the filesystem.
    pub fn project(&self, name: &str) -> Result<Project, ProjectError> {
        if !is_plain_component(name) {
            return Err(ProjectError::InvalidName(name.to_string()));
        }
        Ok(Project::new(name.to_string(), self.root.join(name)))
    }

    /// Resolve a project that must already exist on disk.
    pub async fn open(&self, name: &str) -> Result<Project, ProjectError> {
        let project = self.project(name)?;
        if !project.dir().is_dir() {
            return Err(ProjectError::NotFound(name.to_string()));
        }
        Ok(project)
    }
}
