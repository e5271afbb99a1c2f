use anyhow::{Context, Result};
use clap::Parser;
use eval::{
    BatchJudge, ChatClient, WinTally, load_answers, plot_win_tally, read_question_file, write_jsonl,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "batch_eval")]
#[command(about = "Compare two answer sets question by question with an LLM judge", long_about = None)]
struct Cli {
    /// File with `- Question <n>: ...` lines
    #[arg(long, default_value = "questions.txt")]
    questions: PathBuf,

    /// First answer set, a JSON array of {"result": ...}
    #[arg(long, default_value = "answer1.json")]
    answers1: PathBuf,

    /// Second answer set
    #[arg(long, default_value = "answer2.json")]
    answers2: PathBuf,

    /// JSONL file receiving one evaluation per line
    #[arg(short, long, default_value = "evaluation.jsonl")]
    output: PathBuf,

    /// Optional bar chart of wins per criterion
    #[arg(long)]
    plot: Option<PathBuf>,

    #[arg(long, default_value = "gpt-4o")]
    model: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let queries = read_question_file(&cli.questions)?;
    let answers1 = load_answers(&cli.answers1)?;
    let answers2 = load_answers(&cli.answers2)?;

    let client = ChatClient::new(cli.base_url, cli.api_key, cli.model);
    let judge = BatchJudge::new(&client);
    let report = judge.evaluate_all(&queries, &answers1, &answers2).await?;

    let file = File::create(&cli.output)
        .with_context(|| format!("cannot create {}", cli.output.display()))?;
    write_jsonl(&mut BufWriter::new(file), &report.evaluations)?;

    if !report.dropped.is_empty() {
        tracing::warn!(dropped = ?report.dropped, "Some records were not evaluated");
    }

    let tally = WinTally::from_evaluations(&report.evaluations);
    if let Some(overall) = tally.overall() {
        println!(
            "Overall winner: Answer 1 = {}, Answer 2 = {}, other = {}",
            overall.answer1, overall.answer2, overall.other
        );
    }

    if let Some(path) = &cli.plot {
        plot_win_tally(&tally, path)?;
        println!("Saved win chart to {}", path.display());
    }

    println!("Results saved to {}", cli.output.display());
    Ok(())
}
