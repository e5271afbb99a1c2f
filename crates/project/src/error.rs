use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("invalid project name: {0:?}")]
    InvalidName(String),

    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("project not found: {0}")]
    NotFound(String),

    #[error("please select a project first")]
    NoProjectSelected,

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("uploaded file not found: {0}")]
    FileNotFound(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProjectError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single path component chosen by the user: no separators, no traversal.
pub(crate) fn is_plain_component(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
