//! CLI configuration management.
//!
//! The binary exposes one subcommand per process role:
//!
//! ```text
//! optiscan serve    # HTTP ingestion gateway
//! optiscan worker   # OCR worker process
//! optiscan migrate  # apply pending database migrations and exit
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` on a subcommand to see its options.

mod server;

use std::process;

use clap::{Parser, Subcommand};
use optiscan_postgres::PgConfig;
use optiscan_server::ServiceConfig;
use optiscan_worker::WorkerConfig;
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_STARTUP;

/// Top-level CLI entry point.
#[derive(Debug, Parser)]
#[command(name = "optiscan")]
#[command(about = "Optiscan document OCR pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Process role selected on the command line.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs the HTTP ingestion gateway.
    Serve {
        /// Network binding and lifecycle configuration.
        #[command(flatten)]
        server: ServerConfig,

        /// External service configuration (database, message queue).
        #[command(flatten)]
        service: ServiceConfig,
    },

    /// Runs an OCR worker process.
    Worker {
        /// Worker pool and engine configuration.
        #[command(flatten)]
        worker: WorkerConfig,

        /// Stable identifier for this worker process.
        ///
        /// Generated from a random UUID when not provided.
        #[arg(long, env = "WORKER_ID")]
        worker_id: Option<String>,
    },

    /// Applies pending database migrations and exits.
    Migrate {
        /// Database connection configuration.
        #[command(flatten)]
        postgres: PgConfig,
    },
}

impl Cli {
    /// Loads environment variables from .env (if enabled) and parses CLI
    /// arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// values are visible to clap's `env` fallbacks.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when the dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs build information at debug level.
    pub fn log_build_info(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            "Build information"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_with_connection_flags() {
        let cli = Cli::parse_from([
            "optiscan",
            "serve",
            "--postgres-url",
            "postgresql://localhost/optiscan",
            "--nats-url",
            "nats://localhost:4222",
            "--nats-token",
            "token",
            "--port",
            "8080",
        ]);

        let Command::Serve { server, .. } = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn parses_worker_with_explicit_id() {
        let cli = Cli::parse_from([
            "optiscan",
            "worker",
            "--postgres-url",
            "postgresql://localhost/optiscan",
            "--nats-url",
            "nats://localhost:4222",
            "--nats-token",
            "token",
            "--worker-id",
            "worker-7",
        ]);

        let Command::Worker { worker_id, .. } = cli.command else {
            panic!("expected worker subcommand");
        };
        assert_eq!(worker_id.as_deref(), Some("worker-7"));
    }
}
