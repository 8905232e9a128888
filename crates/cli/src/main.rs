// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! logshipper - loads and runs log-shipping pipeline documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logshipper_daemon::{Manager, SinkConfig};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

#[derive(Parser)]
#[command(name = "logshipper", version, about = "Log-shipping pipeline daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every pipeline document under a directory and run until stopped.
    Run(RunArgs),
    /// Load every pipeline document under a directory without starting any
    /// inputs, reporting config-parse-errors per path.
    Validate(ValidateArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Directory holding `*.yaml`/`*.yml` pipeline documents.
    #[arg(long, value_name = "DIR")]
    config_dir: std::path::PathBuf,

    /// Unused — reload is driven by filesystem events, not polling.
    /// Kept for operators migrating configuration from the Python daemon's
    /// `reload_interval` knob.
    #[arg(long, value_name = "SECONDS")]
    reload_interval: Option<u64>,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Directory holding `*.yaml`/`*.yml` pipeline documents.
    #[arg(long, value_name = "DIR")]
    config_dir: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Validate(args) => validate(args),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    if args.reload_interval.is_some() {
        tracing::warn!("--reload-interval is accepted for compatibility but has no effect: reload is filesystem-event driven");
    }

    let patterns = config_patterns(&args.config_dir);
    let manager = Arc::new(Manager::new(patterns, SinkConfig::default()).context("failed to construct the pipeline manager")?);
    manager.load_all().await.context("failed to load pipeline documents")?;
    manager.start_watching();

    info!(pipelines = ?manager.pipeline_names(), "logshipper ready");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    manager.stop().await;
    Ok(())
}

fn validate(args: ValidateArgs) -> Result<()> {
    let patterns = config_patterns(&args.config_dir);
    let failures = Manager::validate_only(&patterns).context("failed to discover pipeline documents")?;

    if failures.is_empty() {
        println!("all pipeline documents are valid");
        return Ok(());
    }

    for (path, error) in &failures {
        println!("{}: {error}", path.display());
    }
    anyhow::bail!("{} pipeline document(s) failed validation", failures.len());
}

fn config_patterns(dir: &std::path::Path) -> Vec<String> {
    vec![
        dir.join("*.yaml").to_string_lossy().into_owned(),
        dir.join("*.yml").to_string_lossy().into_owned(),
    ]
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
