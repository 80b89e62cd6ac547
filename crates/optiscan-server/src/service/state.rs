//! Application state and dependency injection.

use optiscan_core::fs::ContentStore;
use optiscan_nats::NatsClient;
use optiscan_postgres::PgClient;

use super::ServiceConfig;
use crate::handler::{Error, ErrorKind, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    postgres: PgClient,
    nats: NatsClient,
    content_store: ContentStore,
}

impl ServiceState {
    /// Creates application state from already connected clients.
    pub fn new(postgres: PgClient, nats: NatsClient, content_store: ContentStore) -> Self {
        Self {
            postgres,
            nats,
            content_store,
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres and NATS.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let postgres = config.connect_postgres().map_err(|e| {
            tracing::error!(error = %e, "Failed to create database client");
            Error::new(ErrorKind::InternalServerError)
        })?;

        let nats = config.connect_nats().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to NATS");
            Error::new(ErrorKind::InternalServerError)
        })?;

        Ok(Self {
            postgres,
            nats,
            content_store: config.content_store(),
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(postgres: PgClient);
impl_di!(nats: NatsClient);
impl_di!(content_store: ContentStore);
