//! Task queue backed by a JetStream work queue stream.

use std::time::Duration;

use async_nats::jetstream::{self, AckKind, stream};
use futures::StreamExt;
use tracing::{debug, error, instrument};

use super::task::OcrTask;
use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// Stream holding pending OCR tasks.
const STREAM_NAME: &str = "TASKS_OCR";

/// Subject prefix for task publication.
const SUBJECT_PREFIX: &str = "tasks.ocr";

/// Durable consumer shared by all worker processes.
///
/// Every worker pulls from the same durable, so the server hands each task
/// to exactly one of them at a time.
const CONSUMER_NAME: &str = "ocr_workers";

/// How long a worker may hold an unacknowledged task before redelivery.
const ACK_WAIT: Duration = Duration::from_secs(300);

/// Maximum delivery attempts before the server stops redelivering.
const MAX_DELIVER: i64 = 3;

/// Task queue for distributed OCR processing.
///
/// WorkQueue retention means a message is removed from the stream only
/// when acknowledged, giving at-least-once delivery to the worker pool.
pub struct TaskQueue {
    jetstream: jetstream::Context,
    worker_id: String,
}

impl TaskQueue {
    /// Create a new task queue handle, creating the stream if needed.
    #[instrument(skip(jetstream), target = TRACING_TARGET_QUEUE)]
    pub async fn new(jetstream: &jetstream::Context, worker_id: &str) -> Result<Self> {
        let stream_config = stream::Config {
            name: STREAM_NAME.to_string(),
            description: Some("OCR task queue".to_string()),
            subjects: vec![format!("{SUBJECT_PREFIX}.>")],
            retention: stream::RetentionPolicy::WorkQueue,
            ..Default::default()
        };

        match jetstream.get_stream(STREAM_NAME).await {
            Ok(_) => {
                debug!(
                    target: TRACING_TARGET_QUEUE,
                    stream = STREAM_NAME,
                    worker_id = %worker_id,
                    "Using existing task stream"
                );
            }
            Err(_) => {
                debug!(
                    target: TRACING_TARGET_QUEUE,
                    stream = STREAM_NAME,
                    worker_id = %worker_id,
                    "Creating new task stream"
                );
                jetstream
                    .create_stream(stream_config)
                    .await
                    .map_err(|e| Error::operation("stream_create", e.to_string()))?;
            }
        }

        Ok(Self {
            jetstream: jetstream.clone(),
            worker_id: worker_id.to_string(),
        })
    }

    /// Submit a task to the queue.
    ///
    /// Returns once JetStream has acknowledged persistence.
    #[instrument(skip(self, task), target = TRACING_TARGET_QUEUE)]
    pub async fn submit(&self, task: &OcrTask) -> Result<()> {
        let subject = format!("{SUBJECT_PREFIX}.{}", task.command.kind());
        let payload = serde_json::to_vec(task)?;

        self.jetstream
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| Error::delivery_failed(&subject, e.to_string()))?
            .await
            .map_err(|e| Error::operation("task_submit", e.to_string()))?;

        debug!(
            target: TRACING_TARGET_QUEUE,
            task_id = %task.id,
            document_id = %task.document_id(),
            subject = %subject,
            "Submitted task to queue"
        );
        Ok(())
    }

    /// Create the durable pull consumer for this worker.
    #[instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn create_consumer(&self) -> Result<jetstream::consumer::PullConsumer> {
        let consumer_config = jetstream::consumer::pull::Config {
            name: Some(CONSUMER_NAME.to_string()),
            durable_name: Some(CONSUMER_NAME.to_string()),
            description: Some("OCR worker pool consumer".to_string()),
            ack_wait: ACK_WAIT,
            max_deliver: MAX_DELIVER,
            ..Default::default()
        };

        let stream = self
            .jetstream
            .get_stream(STREAM_NAME)
            .await
            .map_err(|e| Error::stream_error(STREAM_NAME, e.to_string()))?;

        let consumer = stream
            .create_consumer(consumer_config)
            .await
            .map_err(|e| Error::consumer_error(CONSUMER_NAME, e.to_string()))?;

        debug!(
            target: TRACING_TARGET_QUEUE,
            consumer = CONSUMER_NAME,
            worker_id = %self.worker_id,
            "Created worker consumer"
        );
        Ok(consumer)
    }

    /// Fetch the next task from the queue, if one is available.
    ///
    /// The returned delivery holds the unacknowledged message; the caller
    /// must [`TaskDelivery::ack`] or [`TaskDelivery::nak`] it once the
    /// outcome is known. A message with an undecodable payload is
    /// acknowledged and dropped, since redelivery cannot fix it.
    #[instrument(skip(self, consumer), target = TRACING_TARGET_QUEUE)]
    pub async fn fetch_next(
        &self,
        consumer: &jetstream::consumer::PullConsumer,
    ) -> Result<Option<TaskDelivery>> {
        let mut messages = consumer
            .fetch()
            .max_messages(1)
            .messages()
            .await
            .map_err(|e| Error::operation("task_fetch", e.to_string()))?;

        let Some(Ok(message)) = messages.next().await else {
            return Ok(None);
        };

        let task: OcrTask = match serde_json::from_slice(&message.payload) {
            Ok(task) => task,
            Err(e) => {
                error!(
                    target: TRACING_TARGET_QUEUE,
                    error = %e,
                    worker_id = %self.worker_id,
                    "Dropping task with undecodable payload"
                );
                message.ack().await.ok();
                return Ok(None);
            }
        };

        debug!(
            target: TRACING_TARGET_QUEUE,
            task_id = %task.id,
            document_id = %task.document_id(),
            worker_id = %self.worker_id,
            "Claimed task from queue"
        );

        Ok(Some(TaskDelivery { task, message }))
    }

    /// Returns the id of the worker this handle belongs to.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }
}

/// A claimed task together with its unacknowledged JetStream message.
pub struct TaskDelivery {
    task: OcrTask,
    message: jetstream::Message,
}

impl TaskDelivery {
    /// The claimed task.
    pub fn task(&self) -> &OcrTask {
        &self.task
    }

    /// Acknowledge the task, removing it from the work queue.
    ///
    /// Call only after the task's terminal outcome is durably recorded.
    pub async fn ack(self) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|e| Error::Ack(e.to_string()))
    }

    /// Negatively acknowledge, asking the server to redeliver after `delay`.
    pub async fn nak(self, delay: Option<Duration>) -> Result<()> {
        self.message
            .ack_with(AckKind::Nak(delay))
            .await
            .map_err(|e| Error::Ack(e.to_string()))
    }
}

impl std::fmt::Debug for TaskDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDelivery")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}
