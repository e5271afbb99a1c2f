mod config;
mod error;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat};
use crate::routes::{AppState, router};

#[derive(Parser)]
#[command(name = "graphrag-ui")]
#[command(about = "HTTP front-end for managing and querying graphrag projects", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "GRAPHRAG_UI_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = AppConfig::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.server.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    source.log();

    let state = Arc::new(AppState::from_config(&config));
    state.store.ensure_root().await?;

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.server.bind_addr))?;

    tracing::info!(
        addr = %config.server.bind_addr,
        engine = %config.engine.program,
        projects = ?config.projects.root,
        "Server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
