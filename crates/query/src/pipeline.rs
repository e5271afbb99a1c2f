use engine::{EngineCommand, EngineError, GraphragCli, QueryMethod};
use project::{ProjectError, Session};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use visualize::VisualizeError;

use crate::cypher::{LabelQuoting, build_cypher_query};
use crate::response::{EngineResponse, References, extract_references};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("please input a question before starting the query")]
    EmptyQuestion,

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Visualize(#[from] VisualizeError),

    #[error("cannot read visualization {path:?}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("visualization task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// Filtered engine output; empty when the success marker was missing.
    pub response: String,
    pub references: References,
    pub cypher: String,
    /// The rendered HTML, present only when the engine reported success.
    pub visualization: Option<String>,
    /// Why the graph could not be rendered. The answer above is still valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_error: Option<String>,
}

/// One user query: engine run, response parsing, Cypher text and graph artifact.
pub struct QueryCycle<'a> {
    engine: &'a GraphragCli,
    artifact_path: &'a Path,
    artifact_lock: Option<&'a Mutex<()>>,
    quoting: LabelQuoting,
}

impl<'a> QueryCycle<'a> {
    pub fn new(engine: &'a GraphragCli, artifact_path: &'a Path, quoting: LabelQuoting) -> Self {
        Self {
            engine,
            artifact_path,
            artifact_lock: None,
            quoting,
        }
    }

    /// Serialize artifact write and read-back with other holders of `lock`.
    /// The engine run itself is not covered.
    pub fn with_artifact_lock(mut self, lock: &'a Mutex<()>) -> Self {
        self.artifact_lock = Some(lock);
        self
    }

    pub async fn run(
        &self,
        session: &Session,
        question: &str,
        method: QueryMethod,
    ) -> Result<QueryOutcome, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        let project = session.require_project()?;

        let output = self
            .engine
            .run(&EngineCommand::Query {
                root: project.dir().to_path_buf(),
                method,
                query: question.to_string(),
            })
            .await?;

        let response = EngineResponse::parse(&output.stdout);
        let filtered = response.filtered();
        let references = extract_references(&filtered);
        let cypher = build_cypher_query(&references.entities, &references.relationships, self.quoting);

        info!(
            project = project.name(),
            method = %method,
            success = response.is_success(),
            entities = references.entities.len(),
            relationships = references.relationships.len(),
            "Parsed query response"
        );

        let (visualization, visualization_error) = if response.is_success() {
            match self.visualize(project.dir(), &references).await {
                Ok(html) => (Some(html), None),
                Err(e) => {
                    warn!(project = project.name(), error = %e, "Visualization failed");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        Ok(QueryOutcome {
            response: filtered,
            references,
            cypher,
            visualization,
            visualization_error,
        })
    }

    /// Write the artifact, then read it back once the write has returned.
    async fn visualize(&self, working_directory: &Path, references: &References) -> Result<String, QueryError> {
        let entities = references.entities.clone();
        let relationships = references.relationships.clone();
        let working_directory = working_directory.to_path_buf();
        let artifact_path = self.artifact_path.to_path_buf();

        let _guard = match self.artifact_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        tokio::task::spawn_blocking(move || {
            visualize::generate_query_visualization(
                &entities,
                &relationships,
                &working_directory,
                &artifact_path,
            )
        })
        .await??;

        tokio::fs::read_to_string(self.artifact_path)
            .await
            .map_err(|source| QueryError::ReadArtifact {
                path: self.artifact_path.to_path_buf(),
                source,
            })
    }
}
