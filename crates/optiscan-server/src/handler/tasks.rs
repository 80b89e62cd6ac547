//! Task dispatch and status handlers.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use optiscan_nats::NatsClient;
use optiscan_nats::kv::{TaskKey, TaskState};
use optiscan_nats::queue::{OcrTask, TaskCommand};
use optiscan_postgres::PgClient;
use optiscan_postgres::query::DocumentRepository;
use uuid::Uuid;

use super::response::{TaskDispatchResponse, TaskStatusResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for task operations.
const TRACING_TARGET: &str = "optiscan_server::handler::tasks";

/// Queue submitter name used by the gateway.
const GATEWAY_ID: &str = "gateway";

/// `POST /documents/{document_id}/analyze`
///
/// Verifies the document exists, records the task as pending, and enqueues
/// it. Returns immediately; the response never waits for a worker.
#[tracing::instrument(skip(postgres, nats), target = TRACING_TARGET)]
async fn dispatch_analysis(
    State(postgres): State<PgClient>,
    State(nats): State<NatsClient>,
    Path(document_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TaskDispatchResponse>)> {
    postgres
        .find_document_by_id(document_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_resource("document"))?;

    let task = OcrTask::new(TaskCommand::RecognizeText { document_id });
    let key = TaskKey::from(task.id);

    let registry = nats.task_status_store().await?;
    registry.put(&key, &TaskState::Pending).await?;

    let queue = nats.task_queue(GATEWAY_ID).await?;
    if let Err(err) = queue.submit(&task).await {
        // No task was enqueued; do not leave a pending entry behind.
        registry.delete(&key).await.ok();
        return Err(err.into());
    }

    tracing::info!(
        target: TRACING_TARGET,
        task_id = %task.id,
        "Dispatched recognition task"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(TaskDispatchResponse {
            task_id: task.id,
            doc_id: document_id,
        }),
    ))
}

/// `GET /tasks/{task_id}`
///
/// Pure registry read. An unknown task id is 404, distinct from a known
/// task that is still pending.
#[tracing::instrument(skip(nats), target = TRACING_TARGET)]
async fn get_task_status(
    State(nats): State<NatsClient>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskStatusResponse>> {
    let registry = nats.task_status_store().await?;

    let state = registry
        .get_value(&TaskKey::from(task_id))
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_resource("task"))?;

    Ok(Json(TaskStatusResponse::new(task_id, state)))
}

/// Returns a [`Router`] with all task routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/documents/{document_id}/analyze", post(dispatch_analysis))
        .route("/tasks/{task_id}", get(get_task_status))
}
