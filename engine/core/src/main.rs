// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine daemon: loads configuration, wires the services, serves HTTP.

use anyhow::{Context, Result};
use std::sync::Arc;
use synapse_core::presentation::api::{app, AppState};
use synapse_core::EngineConfig;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = match std::env::var("SYNAPSE_CONFIG") {
        Ok(path) => EngineConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        Err(_) => EngineConfig::default(),
    };
    let addr =
        std::env::var("SYNAPSE_LISTEN").unwrap_or_else(|_| "127.0.0.1:7171".to_string());

    info!(node_id = %config.node_id, "starting synapse engine");

    let state = Arc::new(AppState::new(
        config,
        Arc::new(synapse_core::infrastructure::luck::ThreadRngLuck),
    ));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Engine listening on {addr}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Engine shutting down");
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
