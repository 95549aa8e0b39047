mod archive;
mod cli;
mod commands;
mod config;
mod delimiter;
mod mcp;
mod pdf;
mod plan;
mod split;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output and the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp { llm } => {
            mcp::run_server(llm).await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Preview { path, method } => {
            commands::preview::run(&path, &method).await?;
        }
        Commands::Split {
            path,
            method,
            output_dir,
        } => {
            commands::split::run(&path, &method, &output_dir).await?;
        }
    }

    Ok(())
}
