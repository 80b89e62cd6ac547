//! HTTP error types and conversions from the storage and queue layers.

mod core_error;
mod http_error;
mod nats_error;
mod pg_error;

pub use http_error::{Error, ErrorKind, Result};
