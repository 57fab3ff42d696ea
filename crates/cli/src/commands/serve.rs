//! Serve command - run the HTTP API

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use super::build_service;
use crate::args::ServeArgs;
use crate::config::AppConfig;
use crate::server::{self, AppState};

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let service = build_service(&config)?;
    let app = server::router(AppState {
        service: Arc::new(service),
    });

    let bind_addr = args.bind_addr.unwrap_or(config.server.bind_addr);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        model = %config.llm.model,
        source = %config.youtube.source,
        "Listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
