#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::extract::FromRef;
use optiscan_postgres::{PgClient, PgConfig, run_pending_migrations};
use optiscan_server::service::{ServiceConfig, ServiceState};
use optiscan_worker::{RecognitionWorker, WorkerConfig, WorkerState};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::{Cli, Command, ServerConfig};

/// Tracing target for process startup events.
pub const TRACING_TARGET_STARTUP: &str = "optiscan_cli::startup";

/// Tracing target for process shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "optiscan_cli::shutdown";

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "optiscan_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "Process terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "Process terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();
    cli.log_build_info();

    match cli.command {
        Command::Serve { server, service } => serve(server, service).await,
        Command::Worker { worker, worker_id } => run_worker(worker, worker_id).await,
        Command::Migrate { postgres } => migrate(postgres).await,
    }
}

/// Runs the HTTP ingestion gateway until a shutdown signal arrives.
///
/// Pending migrations are applied before the listener opens so the gateway
/// never serves requests against an outdated schema.
async fn serve(server_config: ServerConfig, service_config: ServiceConfig) -> anyhow::Result<()> {
    let state = ServiceState::from_config(&service_config)
        .await
        .context("failed to connect to backing services")?;

    let postgres = PgClient::from_ref(&state);
    run_pending_migrations(&postgres)
        .await
        .context("failed to apply database migrations")?;

    let router = optiscan_server::handler::routes().with_state(state);
    server::serve_http(router, server_config).await?;

    Ok(())
}

/// Runs an OCR worker process until a shutdown signal arrives.
async fn run_worker(config: WorkerConfig, worker_id: Option<String>) -> anyhow::Result<()> {
    let worker_id = worker_id.unwrap_or_else(generate_worker_id);

    let state = WorkerState::from_config(&config)
        .await
        .context("failed to connect to backing services")?;

    let cancel_token = CancellationToken::new();
    let handle = RecognitionWorker::new(state, worker_id.clone(), cancel_token.clone()).spawn();

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        worker_id = %worker_id,
        "Worker is running"
    );

    server::shutdown_signal().await;
    cancel_token.cancel();

    handle
        .await
        .context("worker task panicked")?
        .context("worker terminated with error")?;

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Worker shut down gracefully");
    Ok(())
}

/// Applies pending database migrations and exits.
async fn migrate(config: PgConfig) -> anyhow::Result<()> {
    let client = config.build().context("failed to create database client")?;

    let outcome = run_pending_migrations(&client)
        .await
        .context("failed to apply database migrations")?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        applied = outcome.applied.len(),
        duration_ms = outcome.duration.as_millis() as u64,
        "Migration run completed"
    );

    Ok(())
}

/// Generates a process-unique worker identifier.
fn generate_worker_id() -> String {
    format!("worker-{}", Uuid::new_v4().simple())
}
