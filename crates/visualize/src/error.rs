use parquet::errors::ParquetError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisualizeError {
    #[error("cannot open table {path:?}: {source}")]
    OpenTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read table {path:?}: {source}")]
    ReadTable {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    #[error("table {path:?} has no column `{column}`")]
    MissingColumn { path: PathBuf, column: String },

    #[error("cannot serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write visualization to {path:?}: {source}")]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
