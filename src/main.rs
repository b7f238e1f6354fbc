//! repo-overlap command line
//!
//! Without a subcommand the binary serves the MCP tools over stdio. The other
//! subcommands run one operation and print its JSON result on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repo_overlap::batch::parse_task_list;
use repo_overlap::mcp_server::OverlapMcpServer;
use repo_overlap::{BatchRequest, Config, OverlapClient, RepositoryRef};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Command line interface for repo-overlap
#[derive(Parser, Debug)]
#[command(name = "repo-overlap")]
#[command(about = "Crawl remote repositories, chunk their source and find shared lines")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Maximum chunk length in characters
    #[arg(long, global = true)]
    bound_size: Option<usize>,

    /// GitHub token (falls back to REPO_OVERLAP_TOKEN / GITHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP tools over stdio (default)
    Serve,
    /// Crawl one repository and print its chunks
    Crawl {
        /// `owner/repo`, `owner/repo@ref` or a GitHub URL
        repository: String,
    },
    /// Crawl two repositories and print the lines they share
    Diff {
        repository_a: String,
        repository_b: String,
    },
    /// Run a batch from a task file (JSON array or `identity repository` lines)
    Batch {
        file: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load configuration")?,
    };
    config.apply_env_overrides();

    // CLI args take priority over everything else
    if let Some(bound_size) = cli.bound_size {
        config.chunking.bound_size = bound_size;
    }
    if let Some(token) = &cli.token {
        config.github.token = Some(token.clone());
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Cancel `token` on Ctrl-C so a batch can return its completed tasks
fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the MCP transport and JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client = OverlapClient::with_config(config)?;

    let cancel_token = CancellationToken::new();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            OverlapMcpServer::with_client(Arc::new(client))
                .serve_on_stdio()
                .await?;
        }
        Command::Crawl { repository } => {
            cancel_on_ctrl_c(&cancel_token);
            let repository: RepositoryRef = repository.parse()?;
            let response = client
                .crawl_and_chunk(&repository, None, &cancel_token)
                .await?;
            print_json(&response)?;
        }
        Command::Diff {
            repository_a,
            repository_b,
        } => {
            cancel_on_ctrl_c(&cancel_token);
            let repository_a: RepositoryRef = repository_a.parse()?;
            let repository_b: RepositoryRef = repository_b.parse()?;

            let a = client
                .crawl_and_chunk(&repository_a, None, &cancel_token)
                .await?;
            let b = client
                .crawl_and_chunk(&repository_b, None, &cancel_token)
                .await?;

            let common_lines = client.diff(&a.chunks, &b.chunks);
            print_json(&serde_json::json!({
                "repository_a": a.repository,
                "repository_b": b.repository,
                "count": common_lines.len(),
                "common_lines": common_lines,
            }))?;
        }
        Command::Batch { file } => {
            cancel_on_ctrl_c(&cancel_token);
            let input = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read task file {}", file.display()))?;
            let tasks = parse_task_list(&input)?;

            let report = client
                .run_batch(
                    BatchRequest {
                        tasks,
                        bound_size: None,
                    },
                    &cancel_token,
                )
                .await?;
            print_json(&report)?;
        }
    }

    Ok(())
}
