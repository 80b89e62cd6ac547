//! Task status values stored in the registry.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of a successfully finished task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Document the task operated on.
    pub document_id: Uuid,
    /// `completed` for a fresh extraction, `skipped` when text already
    /// existed and the task changed nothing.
    pub status: TaskResultStatus,
    /// Length of the extracted text, absent on skips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
}

/// How a succeeded task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResultStatus {
    /// Text was extracted and attached.
    Completed,
    /// The document already had text; nothing was changed.
    Skipped,
}

impl TaskResult {
    /// Result for a fresh extraction.
    pub fn completed(document_id: Uuid, text_length: usize) -> Self {
        Self {
            document_id,
            status: TaskResultStatus::Completed,
            text_length: Some(text_length),
        }
    }

    /// Result for an idempotent skip.
    pub fn skipped(document_id: Uuid) -> Self {
        Self {
            document_id,
            status: TaskResultStatus::Skipped,
            text_length: None,
        }
    }
}

/// Task execution status, as recorded in the registry.
///
/// The gateway writes `Pending` at enqueue; the claiming worker writes
/// `Running` and then exactly one terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task is queued and waiting for a worker.
    Pending,

    /// Task is currently being processed.
    Running {
        worker_id: String,
        started_at: Timestamp,
    },

    /// Task finished successfully.
    Succeeded {
        completed_at: Timestamp,
        duration_ms: u64,
        result: TaskResult,
    },

    /// Task failed permanently.
    Failed { failed_at: Timestamp, error: String },
}

impl TaskState {
    /// Running state claimed by the given worker.
    pub fn running(worker_id: impl Into<String>) -> Self {
        Self::Running {
            worker_id: worker_id.into(),
            started_at: Timestamp::now(),
        }
    }

    /// Terminal success state.
    pub fn succeeded(result: TaskResult, duration_ms: u64) -> Self {
        Self::Succeeded {
            completed_at: Timestamp::now(),
            duration_ms,
            result,
        }
    }

    /// Terminal failure state.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            failed_at: Timestamp::now(),
            error: error.into(),
        }
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded { .. } | TaskState::Failed { .. })
    }

    /// Check if the task is actively being processed.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskState::Running { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::running("worker1").is_terminal());
        assert!(TaskState::succeeded(TaskResult::skipped(Uuid::nil()), 5).is_terminal());
        assert!(TaskState::failed("document not found").is_terminal());
    }

    #[test]
    fn active_state() {
        let running = TaskState::running("worker1");
        assert!(running.is_active());
        assert!(!TaskState::Pending.is_active());
    }

    #[test]
    fn result_serializes_with_tag() {
        let state = TaskState::succeeded(TaskResult::completed(Uuid::nil(), 120), 42);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["data"]["result"]["status"], "completed");
        assert_eq!(json["data"]["result"]["text_length"], 120);
    }
}
