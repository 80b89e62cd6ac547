#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
pub const TRACING_TARGET_CLIENT: &str = "optiscan_nats::client";

/// Tracing target for NATS key-value store operations.
pub const TRACING_TARGET_KV: &str = "optiscan_nats::kv";

/// Tracing target for task queue operations.
pub const TRACING_TARGET_QUEUE: &str = "optiscan_nats::queue";

/// Tracing target for NATS connection operations.
pub const TRACING_TARGET_CONNECTION: &str = "optiscan_nats::connection";

mod client;
mod error;
pub mod kv;
pub mod queue;

// Re-export async_nats types needed by consumers
pub use async_nats::jetstream;
pub use client::{NatsClient, NatsConfig};
pub use error::{Error, Result};
