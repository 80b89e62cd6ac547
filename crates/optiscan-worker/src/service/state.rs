//! Worker application state.

use std::sync::Arc;

use optiscan_core::fs::ContentStore;
use optiscan_core::ocr::{EngineService, OcrEngine, OcrService};
use optiscan_nats::NatsClient;
use optiscan_postgres::PgClient;
use tokio::sync::Semaphore;

use super::WorkerConfig;
use crate::service::config::DEFAULT_MAX_CONCURRENT_TASKS;
use crate::{Result, WorkerError};

/// Application state for recognition workers.
///
/// Can be created either directly with [`WorkerState::new`] when clients
/// are already connected (e.g. shared with an HTTP server), or from
/// configuration with [`WorkerState::from_config`].
#[derive(Clone)]
pub struct WorkerState {
    /// PostgreSQL database client.
    pub postgres: PgClient,
    /// NATS messaging client.
    pub nats: NatsClient,
    /// OCR engine wrapped with retries and timeouts.
    pub ocr: EngineService,
    /// Store holding the uploaded document bytes.
    pub content_store: ContentStore,
    /// Maximum concurrent tasks this worker processes simultaneously.
    pub max_concurrent_tasks: usize,
}

impl WorkerState {
    /// Creates a new worker state from existing service instances.
    pub fn new(
        postgres: PgClient,
        nats: NatsClient,
        ocr: EngineService,
        content_store: ContentStore,
    ) -> Self {
        Self {
            postgres,
            nats,
            ocr,
            content_store,
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
        }
    }

    /// Sets the maximum concurrent tasks for this worker state.
    pub fn with_max_concurrent_tasks(mut self, max_concurrent_tasks: usize) -> Self {
        self.max_concurrent_tasks = max_concurrent_tasks;
        self
    }

    /// Creates a semaphore for limiting concurrent task processing.
    pub(crate) fn create_semaphore(&self) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(self.max_concurrent_tasks))
    }

    /// Creates a new worker state from configuration.
    ///
    /// Connects to PostgreSQL and NATS and builds the configured OCR
    /// engine.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting to PostgreSQL or NATS fails, or if
    /// the configured engine name is unknown.
    pub async fn from_config(config: &WorkerConfig) -> Result<Self> {
        let postgres = PgClient::new(config.postgres.clone()).map_err(WorkerError::Database)?;

        let nats = NatsClient::connect(config.nats.clone())
            .await
            .map_err(WorkerError::Queue)?;

        let ocr = build_engine_service(config)?;
        let content_store = ContentStore::new(&config.content_dir);

        Ok(Self {
            postgres,
            nats,
            ocr,
            content_store,
            max_concurrent_tasks: config.max_concurrent_tasks,
        })
    }
}

/// Builds the configured OCR engine behind the retrying service wrapper.
fn build_engine_service(config: &WorkerConfig) -> Result<EngineService> {
    let engine: OcrEngine = config
        .ocr_engine
        .parse()
        .map_err(|e| WorkerError::processing_with_source("Failed to configure OCR engine", e))?;

    let engine = match (engine, config.ocr_languages.as_deref()) {
        (OcrEngine::Tesseract(tesseract), Some(languages)) => {
            OcrEngine::Tesseract(tesseract.with_languages(languages))
        }
        (engine, _) => engine,
    };

    Ok(OcrService::new(engine).with_service_name(config.ocr_engine.clone()))
}

#[cfg(test)]
mod tests {
    use optiscan_nats::NatsConfig;
    use optiscan_postgres::PgConfig;

    use super::*;

    #[test]
    fn builds_engine_from_config() {
        let config = WorkerConfig::new(
            PgConfig::new("postgresql://localhost/optiscan"),
            NatsConfig::new("nats://localhost:4222", "token"),
        );
        assert!(build_engine_service(&config).is_ok());

        let mut mock = config.clone();
        mock.ocr_engine = "mock".to_owned();
        assert!(build_engine_service(&mock).is_ok());

        let mut unknown = config;
        unknown.ocr_engine = "nope".to_owned();
        assert!(build_engine_service(&unknown).is_err());
    }
}
