//! NATS client wrapper and connection configuration.

mod nats_client;
mod nats_config;

pub use nats_client::NatsClient;
pub use nats_config::NatsConfig;
