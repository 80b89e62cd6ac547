//! Core pipeline error to HTTP error conversion.

use crate::handler::{Error, ErrorKind};

/// Tracing target for pipeline error conversions.
const TRACING_TARGET: &str = "optiscan_server::core_error";

impl From<optiscan_core::Error> for Error<'static> {
    fn from(error: optiscan_core::Error) -> Self {
        use optiscan_core::ErrorKind as CoreKind;

        match error.kind() {
            CoreKind::InvalidInput | CoreKind::UnsupportedFormat => {
                ErrorKind::BadRequest.with_message(error.to_string())
            }
            CoreKind::NotFound => ErrorKind::NotFound.into_error(),
            _ => {
                tracing::error!(target: TRACING_TARGET, error = %error, "pipeline error");
                ErrorKind::InternalServerError.with_message("Storage operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_are_named_in_the_body() {
        let error: Error<'static> = optiscan_core::Error::io()
            .with_message("disk full")
            .into();

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), Some("Storage operation failed"));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let error: Error<'static> = optiscan_core::Error::invalid_input()
            .with_message("filename must not be empty")
            .into();

        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
