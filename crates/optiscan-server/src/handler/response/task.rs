//! Task response bodies.

use optiscan_nats::kv::{TaskResult, TaskState};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for a dispatched recognition task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDispatchResponse {
    /// Identifier of the enqueued task.
    pub task_id: Uuid,
    /// Document the task operates on.
    pub doc_id: Uuid,
}

/// Response for a task status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    /// Identifier of the task.
    pub task_id: Uuid,
    /// Current status name: `pending`, `running`, `succeeded` or `failed`.
    pub status: &'static str,
    /// Worker processing the task, present while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// Result payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    /// Failure reason, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskStatusResponse {
    /// Builds the response from a registry state.
    pub fn new(task_id: Uuid, state: TaskState) -> Self {
        let mut response = Self {
            task_id,
            status: status_name(&state),
            worker_id: None,
            result: None,
            error: None,
        };

        match state {
            TaskState::Pending => {}
            TaskState::Running { worker_id, .. } => response.worker_id = Some(worker_id),
            TaskState::Succeeded { result, .. } => response.result = Some(result),
            TaskState::Failed { error, .. } => response.error = Some(error),
        }

        response
    }
}

fn status_name(state: &TaskState) -> &'static str {
    match state {
        TaskState::Pending => "pending",
        TaskState::Running { .. } => "running",
        TaskState::Succeeded { .. } => "succeeded",
        TaskState::Failed { .. } => "failed",
    }
}
