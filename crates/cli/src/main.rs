//! Shopbot CLI: the main entry point.
//!
//! Runs the ERC3 store benchmark: opens a session, solves each task with an
//! LLM agent and submits the session when every task ran.

use clap::Parser;
use std::path::PathBuf;

mod commands;

const EXAMPLES: &str = "\
Examples:
  shopbot                              Run all tasks with OpenRouter
  shopbot -t 3                         Run only task #3
  shopbot -t 1-5                       Run tasks 1 through 5
  shopbot -s                           Stop on the first task scoring 0
  shopbot -l                           List all tasks without running them
  shopbot -p gigachat -m GigaChat-Pro  Use GigaChat
  shopbot --strategy search            Deterministic search instead of the tool loop";

#[derive(Parser, Debug)]
#[command(
    name = "shopbot",
    about = "Shopbot: LLM agent for the ERC3 store benchmark",
    version,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Task number to run (e.g. "3") or inclusive range (e.g. "1-5")
    #[arg(short, long)]
    task: Option<String>,

    /// Stop after the first task with score 0
    #[arg(short, long)]
    stop_on_fail: bool,

    /// List all tasks without running them
    #[arg(short, long)]
    list: bool,

    /// Model ID (default depends on the provider)
    #[arg(short, long)]
    model: Option<String>,

    /// LLM provider [default: openrouter]
    #[arg(short, long, value_parser = ["openrouter", "gigachat"])]
    provider: Option<String>,

    /// How tasks are solved [default: agent]
    #[arg(long, value_parser = ["agent", "search"])]
    strategy: Option<String>,

    /// Path to the config file [default: ~/.shopbot/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let ctx = commands::Context::from_cli(&cli)?;
    if cli.list {
        commands::list::run(&ctx).await
    } else {
        commands::run::run(&ctx, cli.task.clone(), cli.stop_on_fail).await
    }
}
