//! Task definitions for background OCR processing.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work dispatched to the OCR worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrTask {
    /// Unique task identifier, also the status registry key.
    pub id: Uuid,
    /// What the worker should do.
    pub command: TaskCommand,
    /// Timestamp when the task was enqueued.
    pub created_at: Timestamp,
}

impl OcrTask {
    /// Create a new task.
    ///
    /// Ids are v7 UUIDs so tasks sort by creation time.
    pub fn new(command: TaskCommand) -> Self {
        Self {
            id: Uuid::now_v7(),
            command,
            created_at: Timestamp::now(),
        }
    }

    /// Returns the document this task operates on.
    pub fn document_id(&self) -> Uuid {
        match &self.command {
            TaskCommand::RecognizeText { document_id } => *document_id,
        }
    }
}

/// Commands the worker pool understands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TaskCommand {
    /// Run text recognition on a stored document.
    RecognizeText { document_id: Uuid },
}

impl TaskCommand {
    /// Subject suffix for this command kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskCommand::RecognizeText { .. } => "recognize_text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_carries_document_id() {
        let document_id = Uuid::new_v4();
        let task = OcrTask::new(TaskCommand::RecognizeText { document_id });
        assert_eq!(task.document_id(), document_id);
        assert_eq!(task.command.kind(), "recognize_text");
    }

    #[test]
    fn ids_sort_by_creation() {
        let first = OcrTask::new(TaskCommand::RecognizeText {
            document_id: Uuid::new_v4(),
        });
        let second = OcrTask::new(TaskCommand::RecognizeText {
            document_id: Uuid::new_v4(),
        });
        assert!(first.id < second.id);
    }

    #[test]
    fn command_serializes_with_tag() {
        let command = TaskCommand::RecognizeText {
            document_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["command"], "recognize_text");
    }
}
