//! Health monitoring handlers.

use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use optiscan_core::ServiceHealth;
use optiscan_nats::NatsClient;
use optiscan_postgres::PgClient;

use super::response::{HealthResponse, ServiceHealthEntry};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "optiscan_server::handler::monitors";

/// `GET /health`
///
/// Probes Postgres and NATS; 200 when every dependency is operational,
/// 503 otherwise. The body carries the per-service reports either way.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn health_status(
    State(postgres): State<PgClient>,
    State(nats): State<NatsClient>,
) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse::new(vec![
        ServiceHealthEntry::new("postgres", probe_postgres(&postgres).await),
        ServiceHealthEntry::new("nats", probe_nats(&nats).await),
    ]);

    let status_code = if response.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = %response.status,
        status_code = status_code.as_u16(),
        "Health probes completed"
    );

    (status_code, Json(response))
}

/// Probes the database by acquiring a pooled connection.
async fn probe_postgres(postgres: &PgClient) -> ServiceHealth {
    let start = Instant::now();
    match postgres.get_connection().await {
        Ok(_conn) => ServiceHealth::healthy().with_response_time(start.elapsed()),
        Err(err) => ServiceHealth::unhealthy(err.to_string()),
    }
}

/// Probes the NATS connection with a flush round trip.
async fn probe_nats(nats: &NatsClient) -> ServiceHealth {
    match nats.ping().await {
        Ok(round_trip) => ServiceHealth::healthy().with_response_time(round_trip),
        Err(err) => ServiceHealth::unhealthy(err.to_string()),
    }
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}
