//! Queue and registry error to HTTP error conversion.

use crate::handler::{Error, ErrorKind};

/// Tracing target for queue error conversions.
const TRACING_TARGET: &str = "optiscan_server::nats_error";

impl From<optiscan_nats::Error> for Error<'static> {
    fn from(error: optiscan_nats::Error) -> Self {
        tracing::error!(target: TRACING_TARGET, error = %error, "queue error");
        ErrorKind::InternalServerError.into_error()
    }
}
