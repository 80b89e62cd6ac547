//! Database migration runner.
//!
//! Migrations are embedded into the binary and applied on startup. The
//! harness is synchronous, so it runs on a blocking thread against a
//! connection temporarily taken out of the pool.

use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Outcome of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Versions applied during this run, in order.
    pub applied: Vec<String>,
    /// Total time spent applying migrations.
    pub duration: Duration,
}

impl MigrationResult {
    /// Returns whether any migrations were applied.
    pub fn applied_any(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Runs all pending migrations on the database.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    tracing::info!(target: TRACING_TARGET_MIGRATION, "Checking for pending migrations");

    let start = Instant::now();
    let conn = pg.get_pooled_connection().await?;
    let mut conn: AsyncConnectionWrapper<_> = conn.into();

    let results = spawn_blocking(move || {
        let versions = conn.run_pending_migrations(MIGRATIONS)?;
        Ok::<_, Box<dyn std::error::Error + Send + Sync>>(
            versions.into_iter().map(|v| v.to_string()).collect::<Vec<_>>(),
        )
    })
    .await;

    let duration = start.elapsed();
    let applied = results
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Migration task panicked"
            );
            PgError::Migration(err.into())
        })?
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                duration = ?duration,
                error = &*err,
                "Database migration failed"
            );
            PgError::Migration(err)
        })?;

    if applied.is_empty() {
        tracing::info!(target: TRACING_TARGET_MIGRATION, "Database schema is up to date");
    } else {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            migrations = ?applied,
            "Applied pending migrations"
        );
    }

    Ok(MigrationResult { applied, duration })
}
