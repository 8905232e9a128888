// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! logshipperd: loads every pipeline document matched by its configured
//! globs, starts their inputs, and dispatches messages until a shutdown
//! signal arrives.
//!
//! This binary is normally started by the `logshipper` CLI's `run`
//! subcommand rather than invoked directly; it reads its config-dir glob
//! from `LOGSHIPPER_CONFIG_GLOB` so the CLI and the daemon agree on
//! discovery without a client/server protocol between them.

use logshipper_daemon::{Manager, SinkConfig};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();

    let pattern = std::env::var("LOGSHIPPER_CONFIG_GLOB").unwrap_or_else(|_| "/etc/logshipper/*.yaml".to_string());

    let manager = Arc::new(Manager::new(vec![pattern], SinkConfig::default())?);
    manager.load_all().await?;
    manager.start_watching();

    info!(pipelines = ?manager.pipeline_names(), "logshipperd ready");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    manager.stop().await;
    info!("logshipperd stopped");
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
