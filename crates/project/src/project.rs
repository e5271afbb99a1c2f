use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{ProjectError, is_plain_component};

/// Documents the engine indexes.
pub const INPUT_DIR: &str = "input";
/// Tables the engine writes after indexing.
pub const OUTPUT_DIR: &str = "output";

const UPLOAD_EXTENSIONS: &[&str] = &["txt"];

/// One engine working directory under the projects root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    name: String,
    dir: PathBuf,
}

impl Project {
    pub(crate) fn new(name: String, dir: PathBuf) -> Self {
        Self { name, dir }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn input_dir(&self) -> PathBuf {
        self.dir.join(INPUT_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.join(OUTPUT_DIR)
    }

    /// Store an uploaded document under `input/`, replacing any file with the same name.
    pub async fn save_upload(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, ProjectError> {
        if !is_plain_component(file_name) {
            return Err(ProjectError::InvalidFileName(file_name.to_string()));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !UPLOAD_EXTENSIONS.contains(&extension) {
            return Err(ProjectError::UnsupportedFormat(extension.to_string()));
        }

        let input_dir = self.input_dir();
        fs::create_dir_all(&input_dir)
            .await
            .map_err(|e| ProjectError::io(&input_dir, e))?;

        let path = input_dir.join(file_name);
        fs::write(&path, contents)
            .await
            .map_err(|e| ProjectError::io(&path, e))?;

        info!(project = %self.name, file = file_name, bytes = contents.len(), "Stored upload");
        Ok(path)
    }

    /// Names of the files under `input/`, sorted. A missing `input/` means no uploads yet.
    pub async fn list_uploads(&self) -> Result<Vec<String>, ProjectError> {
        let input_dir = self.input_dir();
        if !fs::try_exists(&input_dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&input_dir)
            .await
            .map_err(|e| ProjectError::io(&input_dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProjectError::io(&input_dir, e))?
        {
            let path = entry.path();
            if path.is_file() {
                files.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        files.sort();
        Ok(files)
    }

    pub async fn delete_upload(&self, file_name: &str) -> Result<(), ProjectError> {
        if !is_plain_component(file_name) {
            return Err(ProjectError::InvalidFileName(file_name.to_string()));
        }

        let path = self.input_dir().join(file_name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(project = %self.name, file = file_name, "Deleted upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProjectError::FileNotFound(file_name.to_string()))
            }
            Err(e) => Err(ProjectError::io(&path, e)),
        }
    }
}
