//! Gateway configuration.

#[cfg(feature = "config")]
use clap::Args;
use optiscan_core::fs::ContentStore;
use optiscan_nats::{NatsClient, NatsConfig};
use optiscan_postgres::{PgClient, PgConfig, PgResult};
use serde::{Deserialize, Serialize};

/// Default directory for stored document bytes.
const DEFAULT_CONTENT_DIR: &str = "uploaded_files";

/// Gateway configuration.
///
/// Combines connection configuration for external services with the
/// content store location. This is the main configuration type passed to
/// [`ServiceState::from_config`].
///
/// [`ServiceState::from_config`]: super::ServiceState::from_config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Postgres database configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// NATS configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,

    /// Directory where uploaded document bytes are stored.
    ///
    /// Must be the same directory the worker pool reads from.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "content-dir",
            env = "CONTENT_DIR",
            default_value = DEFAULT_CONTENT_DIR
        )
    )]
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
}

fn default_content_dir() -> String {
    DEFAULT_CONTENT_DIR.to_owned()
}

impl ServiceConfig {
    /// Creates a new gateway configuration.
    pub fn new(postgres: PgConfig, nats: NatsConfig) -> Self {
        Self {
            postgres,
            nats,
            content_dir: default_content_dir(),
        }
    }

    /// Sets the content directory.
    pub fn with_content_dir(mut self, content_dir: impl Into<String>) -> Self {
        self.content_dir = content_dir.into();
        self
    }

    /// Validates settings and connects to the Postgres database.
    pub fn connect_postgres(&self) -> PgResult<PgClient> {
        self.postgres.clone().build()
    }

    /// Connects to the NATS server.
    pub async fn connect_nats(&self) -> optiscan_nats::Result<NatsClient> {
        NatsClient::connect(self.nats.clone()).await
    }

    /// Returns a content store rooted at the configured directory.
    pub fn content_store(&self) -> ContentStore {
        ContentStore::new(&self.content_dir)
    }
}
