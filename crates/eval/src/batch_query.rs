use engine::{EngineCommand, EngineError, GraphragCli, QueryMethod};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

const SEPARATOR_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs a question list through the engine, one process per question.
pub struct BatchQueryRunner<'a> {
    engine: &'a GraphragCli,
    root: PathBuf,
    method: QueryMethod,
}

impl<'a> BatchQueryRunner<'a> {
    pub fn new(engine: &'a GraphragCli, root: impl Into<PathBuf>, method: QueryMethod) -> Self {
        Self {
            engine,
            root: root.into(),
            method,
        }
    }

    /// Append every answer (or failure) to `out` in question order.
    ///
    /// A query that exits non-zero is recorded and the batch continues. An
    /// engine that cannot be started at all stops the batch.
    pub async fn run(&self, questions: &[String], out: &mut impl Write) -> anyhow::Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let separator = "=".repeat(SEPARATOR_WIDTH);

        for (i, question) in questions.iter().enumerate() {
            let counter = i + 1;
            let command = EngineCommand::Query {
                root: self.root.clone(),
                method: self.method,
                query: question.clone(),
            };

            match self.engine.run(&command).await {
                Ok(output) => {
                    writeln!(out, "Question: {}", question)?;
                    writeln!(out, "Answer:\n{}", output.stdout)?;
                    writeln!(out, "{}", separator)?;
                    info!(counter, "Query succeeded");
                    println!("Question {} Success", counter);
                    summary.succeeded += 1;
                }
                Err(EngineError::Failed { stderr, code, .. }) => {
                    writeln!(out, "Error occurred while querying: {}", question)?;
                    writeln!(out, "Error message: {}", stderr)?;
                    writeln!(out, "{}", separator)?;
                    warn!(counter, code = ?code, "Query failed");
                    println!("---------------------- Question {} Fail ----------------------", counter);
                    summary.failed += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        out.flush()?;
        Ok(summary)
    }
}
