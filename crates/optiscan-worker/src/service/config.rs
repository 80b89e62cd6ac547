//! Worker configuration.

#[cfg(feature = "config")]
use clap::Args;
use optiscan_nats::NatsConfig;
use optiscan_postgres::PgConfig;
use serde::{Deserialize, Serialize};

/// Default maximum concurrent tasks per worker process.
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 4;

/// Default directory for stored document bytes.
pub const DEFAULT_CONTENT_DIR: &str = "uploaded_files";

/// Default OCR engine name.
pub const DEFAULT_OCR_ENGINE: &str = "tesseract";

/// Complete worker configuration.
///
/// Combines connection configuration for external services with worker
/// behavior settings. This is the main configuration type passed to
/// [`WorkerState::from_config`].
///
/// [`WorkerState::from_config`]: super::WorkerState::from_config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct WorkerConfig {
    /// Postgres database configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// NATS configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,

    /// Directory where uploaded document bytes are stored.
    ///
    /// Must be the same directory the ingestion gateway writes to.
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

    /// OCR engine to run tasks with (`tesseract` or `mock`).
    #[cfg_attr(
        feature = "config",
        arg(
            long = "ocr-engine",
            env = "OCR_ENGINE",
            default_value = DEFAULT_OCR_ENGINE
        )
    )]
    #[serde(default = "default_ocr_engine")]
    pub ocr_engine: String,

    /// Recognition languages passed to the engine (e.g. `eng+rus`).
    #[cfg_attr(
        feature = "config",
        arg(long = "ocr-languages", env = "OCR_LANGUAGES")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_languages: Option<String>,

    /// Maximum concurrent tasks a worker can process simultaneously.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "worker-max-concurrent-tasks",
            env = "WORKER_MAX_CONCURRENT_TASKS",
            default_value_t = DEFAULT_MAX_CONCURRENT_TASKS
        )
    )]
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
}

fn default_content_dir() -> String {
    DEFAULT_CONTENT_DIR.to_owned()
}

fn default_ocr_engine() -> String {
    DEFAULT_OCR_ENGINE.to_owned()
}

fn default_max_concurrent_tasks() -> usize {
    DEFAULT_MAX_CONCURRENT_TASKS
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    pub fn new(postgres: PgConfig, nats: NatsConfig) -> Self {
        Self {
            postgres,
            nats,
            content_dir: default_content_dir(),
            ocr_engine: default_ocr_engine(),
            ocr_languages: None,
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
        }
    }

    /// Sets the content directory.
    pub fn with_content_dir(mut self, content_dir: impl Into<String>) -> Self {
        self.content_dir = content_dir.into();
        self
    }

    /// Sets the concurrency limit.
    pub fn with_max_concurrent_tasks(mut self, max_concurrent_tasks: usize) -> Self {
        self.max_concurrent_tasks = max_concurrent_tasks;
        self
    }
}
