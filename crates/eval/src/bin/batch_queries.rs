use anyhow::{Context, Result};
use clap::Parser;
use engine::{GraphragCli, QueryMethod};
use eval::{BatchQueryRunner, read_question_file, solana_question_set};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "batch_queries")]
#[command(about = "Run a question set through graphrag query and save the answers", long_about = None)]
struct Cli {
    /// Project directory passed as --root
    #[arg(long, default_value = "./projects/Solana")]
    root: PathBuf,

    /// Query method
    #[arg(long, default_value = "drift")]
    method: QueryMethod,

    /// Where answers are written
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Read `- Question <n>: ...` lines from this file instead of the built-in set
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Engine command line, split on whitespace like the server does
    #[arg(long, env = "GRAPHRAG_UI_ENGINE", default_value = "python -m graphrag")]
    engine: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let questions = match &cli.questions {
        Some(path) => read_question_file(path)?,
        None => solana_question_set(),
    };

    let engine = GraphragCli::from_command_line(&cli.engine).context("engine command line is empty")?;
    let runner = BatchQueryRunner::new(&engine, cli.root, cli.method);

    let file = File::create(&cli.output)
        .with_context(|| format!("cannot create {}", cli.output.display()))?;
    let mut out = BufWriter::new(file);

    let summary = runner.run(&questions, &mut out).await?;

    tracing::info!(succeeded = summary.succeeded, failed = summary.failed, "Batch finished");
    println!("Results saved to {}", cli.output.display());
    Ok(())
}
