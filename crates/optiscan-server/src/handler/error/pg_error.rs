//! Database error to HTTP error conversion.

use optiscan_postgres::PgError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "optiscan_server::pg_error";

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = constraint,
                error = %error,
                "query hit a constraint violation"
            );
            return ErrorKind::Conflict.into_error();
        }

        tracing::error!(target: TRACING_TARGET, error = %error, "database error");
        ErrorKind::InternalServerError.with_message("Database operation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_failures_are_distinct_from_storage_failures() {
        let database: Error<'static> =
            PgError::Unexpected("connection pool exhausted".into()).into();
        let storage: Error<'static> = optiscan_core::Error::io().into();

        assert_eq!(database.kind(), ErrorKind::InternalServerError);
        assert_eq!(database.message(), Some("Database operation failed"));
        assert_ne!(database.message(), storage.message());
    }
}
