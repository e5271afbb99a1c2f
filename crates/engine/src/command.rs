use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Retrieval strategy passed to `query --method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMethod {
    #[default]
    Local,
    Global,
    Drift,
}

impl QueryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMethod::Local => "local",
            QueryMethod::Global => "global",
            QueryMethod::Drift => "drift",
        }
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(QueryMethod::Local),
            "global" => Ok(QueryMethod::Global),
            "drift" => Ok(QueryMethod::Drift),
            other => Err(format!("unknown query method: {}", other)),
        }
    }
}

/// One invocation of the external engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum EngineCommand {
    Init {
        root: PathBuf,
    },
    Index {
        root: PathBuf,
    },
    PromptTune {
        root: PathBuf,
        domain: String,
        chunk_size: u32,
    },
    Update {
        root: PathBuf,
    },
    Query {
        root: PathBuf,
        method: QueryMethod,
        query: String,
    },
}

impl EngineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::Init { .. } => "init",
            EngineCommand::Index { .. } => "index",
            EngineCommand::PromptTune { .. } => "prompt-tune",
            EngineCommand::Update { .. } => "update",
            EngineCommand::Query { .. } => "query",
        }
    }

    pub fn root(&self) -> &PathBuf {
        match self {
            EngineCommand::Init { root }
            | EngineCommand::Index { root }
            | EngineCommand::PromptTune { root, .. }
            | EngineCommand::Update { root }
            | EngineCommand::Query { root, .. } => root,
        }
    }

    /// Subcommand and flags, in the order the engine expects them.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            self.name().to_string(),
            "--root".to_string(),
            self.root().to_string_lossy().to_string(),
        ];

        match self {
            EngineCommand::PromptTune {
                domain, chunk_size, ..
            } => {
                args.push("--domain".to_string());
                args.push(domain.clone());
                args.push("--chunk-size".to_string());
                args.push(chunk_size.to_string());
            }
            EngineCommand::Query { method, query, .. } => {
                args.push("--method".to_string());
                args.push(method.to_string());
                args.push("--query".to_string());
                args.push(query.clone());
            }
            _ => {}
        }

        args
    }
}

/// Captured streams of a successful run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineOutput {
    pub stdout: String,
    pub stderr: String,
}
