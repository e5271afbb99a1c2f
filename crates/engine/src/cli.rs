use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{info, warn};

use crate::command::{EngineCommand, EngineOutput};
use crate::error::EngineError;

/// Runs the engine as a child process and waits for it to exit.
#[derive(Debug, Clone)]
pub struct GraphragCli {
    program: String,
    base_args: Vec<String>,
}

impl GraphragCli {
    pub fn new(program: String, base_args: Vec<String>) -> Self {
        Self { program, base_args }
    }

    /// Split a command line such as `python -m graphrag` on whitespace: the
    /// first word is the program, the rest are base arguments. Blank input
    /// gives `None`. No shell quoting is applied.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(String::from);
        let program = words.next()?;
        Some(Self::new(program, words.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn base_args(&self) -> &[String] {
        &self.base_args
    }

    /// Full argument vector for a command, without the program name.
    pub fn command_line(&self, command: &EngineCommand) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend(command.args());
        args
    }

    /// Spawn the engine, capture both streams, and block until it exits.
    pub async fn run(&self, command: &EngineCommand) -> Result<EngineOutput, EngineError> {
        let args = self.command_line(command);
        let start = Instant::now();

        info!(
            program = %self.program,
            command = command.name(),
            root = ?command.root(),
            "Starting engine"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            warn!(
                command = command.name(),
                code = ?output.status.code(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Engine exited with failure"
            );
            return Err(EngineError::Failed {
                command: command.name().to_string(),
                code: output.status.code(),
                stderr,
            });
        }

        info!(
            command = command.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            stdout_bytes = stdout.len(),
            "Engine finished"
        );

        Ok(EngineOutput { stdout, stderr })
    }
}

/// `graphrag` on PATH.
impl Default for GraphragCli {
    fn default() -> Self {
        Self::new("graphrag".to_string(), Vec::new())
    }
}
