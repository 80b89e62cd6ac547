//! Recognition worker for the OCR task queue.
//!
//! Pulls tasks from the shared durable consumer, runs the configured OCR
//! engine over the stored document bytes, attaches the extracted text, and
//! records the outcome in the task status registry.
//!
//! Acknowledgement is late: the JetStream message is acked only after the
//! terminal outcome is durably recorded. A worker that crashes mid-task
//! loses nothing; the task is redelivered and the idempotent text attach
//! turns the retry into a skip.

use std::sync::Arc;
use std::time::{Duration, Instant};

use optiscan_core::fs::{ContentStore, mime_type_for_path};
use optiscan_core::ocr::{Ocr, Request};
use optiscan_nats::kv::{TaskKey, TaskResult, TaskState, TaskStatusStore};
use optiscan_nats::queue::{OcrTask, TaskDelivery};
use optiscan_postgres::model::NewDocumentText;
use optiscan_postgres::query::{DocumentRepository, DocumentTextRepository, TextAttachOutcome};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, WorkerError};
use crate::service::WorkerState;

/// Tracing target for the recognition worker.
const TRACING_TARGET: &str = "optiscan_worker::recognize";

/// How long to wait before polling again when the queue is empty.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Redelivery delay requested when a task hits a transient failure.
const RETRY_DELAY: Duration = Duration::from_secs(30);

/// Background worker draining the OCR task queue.
pub struct RecognitionWorker {
    state: WorkerState,
    worker_id: String,
    cancel_token: CancellationToken,
    semaphore: Arc<Semaphore>,
}

impl RecognitionWorker {
    /// Creates a new recognition worker.
    ///
    /// `worker_id` identifies this process in the task status registry;
    /// all workers still pull from the same durable consumer.
    pub fn new(
        state: WorkerState,
        worker_id: impl Into<String>,
        cancel_token: CancellationToken,
    ) -> Self {
        let semaphore = state.create_semaphore();
        Self {
            state,
            worker_id: worker_id.into(),
            cancel_token,
            semaphore,
        }
    }

    /// Spawns the worker as a background task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Runs the worker loop until cancelled.
    #[tracing::instrument(
        skip(self),
        fields(worker_id = %self.worker_id),
        target = TRACING_TARGET,
        name = "recognition_worker"
    )]
    async fn run(self) -> Result<()> {
        tracing::info!(target: TRACING_TARGET, "Starting recognition worker");

        let queue = self.state.nats.task_queue(&self.worker_id).await?;
        let registry = self.state.nats.task_status_store().await?;
        let consumer = queue.create_consumer().await?;

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        "Shutdown requested, stopping recognition worker"
                    );
                    break;
                }

                result = queue.fetch_next(&consumer) => {
                    let delivery = match result {
                        Ok(Some(delivery)) => delivery,
                        Ok(None) => {
                            tokio::time::sleep(POLL_INTERVAL).await;
                            continue;
                        }
                        Err(err) => {
                            tracing::error!(
                                target: TRACING_TARGET,
                                error = %err,
                                "Failed to fetch task"
                            );
                            tokio::time::sleep(POLL_INTERVAL).await;
                            continue;
                        }
                    };

                    let permit = match self.semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::error!(
                                target: TRACING_TARGET,
                                "Semaphore closed, stopping worker"
                            );
                            break;
                        }
                    };

                    let state = self.state.clone();
                    let registry = registry.clone();
                    let worker_id = self.worker_id.clone();

                    tokio::spawn(async move {
                        // Hold the permit until the task settles.
                        let _permit = permit;
                        process_delivery(&state, &registry, &worker_id, delivery).await;
                    });
                }
            }
        }

        Ok(())
    }
}

/// How a task attempt ended short of success.
#[derive(Debug)]
enum TaskFailure {
    /// The task can never succeed; record failure and ack.
    Terminal(String),
    /// Infrastructure hiccup; leave the task unacked for redelivery.
    Transient(WorkerError),
}

/// Processes one claimed task through to ack or nak.
#[tracing::instrument(
    skip_all,
    fields(task_id = %delivery.task().id, document_id = %delivery.task().document_id()),
    target = TRACING_TARGET
)]
async fn process_delivery(
    state: &WorkerState,
    registry: &TaskStatusStore,
    worker_id: &str,
    delivery: TaskDelivery,
) {
    let task = delivery.task().clone();
    let key = TaskKey::from(task.id);
    let started = Instant::now();

    // A failed Running write is tolerable; the terminal write is not.
    if let Err(err) = registry.put(&key, &TaskState::running(worker_id)).await {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %err,
            "Failed to record running state"
        );
    }

    let outcome = execute_task(&state.postgres, &state.content_store, &state.ocr, &task).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let terminal = match outcome {
        Ok(result) => {
            tracing::info!(
                target: TRACING_TARGET,
                status = ?result.status,
                text_length = result.text_length,
                duration_ms,
                "Task succeeded"
            );
            TaskState::succeeded(result, duration_ms)
        }
        Err(TaskFailure::Terminal(reason)) => {
            tracing::warn!(
                target: TRACING_TARGET,
                reason = %reason,
                duration_ms,
                "Task failed permanently"
            );
            TaskState::failed(reason)
        }
        Err(TaskFailure::Transient(err)) => {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                duration_ms,
                "Task hit transient failure, requesting redelivery"
            );
            // Best effort; redelivery overwrites this with a fresh attempt.
            registry
                .put(&key, &TaskState::failed(err.to_string()))
                .await
                .ok();
            if let Err(err) = delivery.nak(Some(RETRY_DELAY)).await {
                tracing::error!(target: TRACING_TARGET, error = %err, "Failed to nak task");
            }
            return;
        }
    };

    // The terminal state must be durable before the ack removes the task
    // from the queue; otherwise redelivery replays the attempt.
    if let Err(err) = registry.put(&key, &terminal).await {
        tracing::error!(
            target: TRACING_TARGET,
            error = %err,
            "Failed to record terminal state, requesting redelivery"
        );
        if let Err(err) = delivery.nak(Some(RETRY_DELAY)).await {
            tracing::error!(target: TRACING_TARGET, error = %err, "Failed to nak task");
        }
        return;
    }

    if let Err(err) = delivery.ack().await {
        // The task redelivers; the idempotent attach makes the retry a skip.
        tracing::error!(target: TRACING_TARGET, error = %err, "Failed to ack task");
    }
}

/// Runs the recognition pipeline for a single task.
///
/// The missing-file check runs before the idempotent-skip check: a document
/// whose bytes disappeared is a failure even when a previous run already
/// attached text.
///
/// An engine failure does not fail the task: the error text is attached in
/// place of the extraction so the document is marked as processed and the
/// queue does not churn on an image the engine cannot read.
async fn execute_task<Repo, Engine>(
    repo: &Repo,
    content_store: &ContentStore,
    engine: &Engine,
    task: &OcrTask,
) -> Result<TaskResult, TaskFailure>
where
    Repo: DocumentRepository + DocumentTextRepository,
    Engine: Ocr,
{
    let document_id = task.document_id();

    let document = repo
        .find_document_by_id(document_id)
        .await
        .map_err(|e| TaskFailure::Transient(e.into()))?
        .ok_or_else(|| TaskFailure::Terminal(format!("document {document_id} not found")))?;

    if !content_store.exists(&document.path).await {
        return Err(TaskFailure::Terminal(format!(
            "file not found: {}",
            document.path
        )));
    }

    let existing = repo
        .find_text_by_document_id(document_id)
        .await
        .map_err(|e| TaskFailure::Transient(e.into()))?;
    if existing.is_some() {
        return Ok(TaskResult::skipped(document_id));
    }

    let bytes = content_store.read(&document.path).await.map_err(|e| {
        TaskFailure::Transient(WorkerError::processing_with_source(
            "Failed to read document bytes",
            e,
        ))
    })?;

    let mime_type = mime_type_for_path(&document.path);
    let request = Request::new(bytes, mime_type);

    let text = match engine.recognize(request).await {
        Ok(response) => response.text,
        Err(err) => fallback_text(&err),
    };
    let text_length = text.len();

    let outcome = repo
        .attach_document_text(NewDocumentText { document_id, text })
        .await
        .map_err(|e| TaskFailure::Transient(e.into()))?;

    Ok(match outcome {
        TextAttachOutcome::Attached => TaskResult::completed(document_id, text_length),
        TextAttachOutcome::AlreadyProcessed => TaskResult::skipped(document_id),
    })
}

/// Text attached when the engine cannot extract anything.
fn fallback_text(error: &optiscan_core::Error) -> String {
    format!("OCR processing failed: {error}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use optiscan_core::ErrorKind;
    use optiscan_core::ocr::MockOcr;
    use optiscan_nats::kv::TaskResultStatus;
    use optiscan_nats::queue::TaskCommand;
    use optiscan_postgres::PgResult;
    use optiscan_postgres::model::{Document, DocumentText, NewDocument};
    use uuid::Uuid;

    use super::*;

    /// In-memory stand-in for the database repositories.
    ///
    /// `hide_existing_text` makes `find_text_by_document_id` report no text
    /// while the attach CAS still sees it, mimicking a concurrent attach
    /// landing between the check and the insert.
    #[derive(Default)]
    struct MemoryRepo {
        documents: Mutex<HashMap<Uuid, Document>>,
        texts: Mutex<HashMap<Uuid, DocumentText>>,
        hide_existing_text: bool,
    }

    impl MemoryRepo {
        fn with_document(document: Document) -> Self {
            let repo = Self::default();
            repo.documents
                .lock()
                .unwrap()
                .insert(document.id, document);
            repo
        }

        fn attach(&self, document_id: Uuid, text: &str) {
            self.texts.lock().unwrap().insert(
                document_id,
                DocumentText {
                    id: Uuid::new_v4(),
                    document_id,
                    text: text.to_owned(),
                    created_at: jiff::Timestamp::now().into(),
                },
            );
        }

        fn text_for(&self, document_id: Uuid) -> Option<String> {
            self.texts
                .lock()
                .unwrap()
                .get(&document_id)
                .map(|t| t.text.clone())
        }

        fn text_count(&self) -> usize {
            self.texts.lock().unwrap().len()
        }
    }

    impl DocumentRepository for MemoryRepo {
        async fn create_document(&self, new_document: NewDocument) -> PgResult<Document> {
            let document = Document {
                id: Uuid::new_v4(),
                path: new_document.path,
                doc_date: new_document.doc_date,
                created_at: jiff::Timestamp::now().into(),
            };
            self.documents
                .lock()
                .unwrap()
                .insert(document.id, document.clone());
            Ok(document)
        }

        async fn find_document_by_id(&self, document_id: Uuid) -> PgResult<Option<Document>> {
            Ok(self.documents.lock().unwrap().get(&document_id).cloned())
        }

        async fn find_document_with_text(
            &self,
            document_id: Uuid,
        ) -> PgResult<Option<(Document, Option<DocumentText>)>> {
            let document = self.documents.lock().unwrap().get(&document_id).cloned();
            Ok(document.map(|document| {
                let text = self.texts.lock().unwrap().get(&document_id).cloned();
                (document, text)
            }))
        }

        async fn delete_document(&self, document_id: Uuid) -> PgResult<Option<Document>> {
            self.texts.lock().unwrap().remove(&document_id);
            Ok(self.documents.lock().unwrap().remove(&document_id))
        }
    }

    impl DocumentTextRepository for MemoryRepo {
        async fn attach_document_text(
            &self,
            new_text: NewDocumentText,
        ) -> PgResult<TextAttachOutcome> {
            let mut texts = self.texts.lock().unwrap();
            if texts.contains_key(&new_text.document_id) {
                return Ok(TextAttachOutcome::AlreadyProcessed);
            }
            texts.insert(
                new_text.document_id,
                DocumentText {
                    id: Uuid::new_v4(),
                    document_id: new_text.document_id,
                    text: new_text.text,
                    created_at: jiff::Timestamp::now().into(),
                },
            );
            Ok(TextAttachOutcome::Attached)
        }

        async fn find_text_by_document_id(
            &self,
            document_id: Uuid,
        ) -> PgResult<Option<DocumentText>> {
            if self.hide_existing_text {
                return Ok(None);
            }
            Ok(self.texts.lock().unwrap().get(&document_id).cloned())
        }
    }

    fn recognize_task(document_id: Uuid) -> OcrTask {
        OcrTask::new(TaskCommand::RecognizeText { document_id })
    }

    /// Stores real bytes in the content store and returns a matching row.
    async fn stored_document(store: &ContentStore) -> Document {
        let day = jiff::civil::date(2026, 3, 14);
        let stored = store.store("scan.png", day, b"image bytes").await.unwrap();
        Document {
            id: Uuid::new_v4(),
            path: stored.path_str(),
            doc_date: day.into(),
            created_at: jiff::Timestamp::now().into(),
        }
    }

    #[test]
    fn fallback_text_carries_engine_error() {
        let err = optiscan_core::Error::external_error().with_message("tesseract exited with 1");
        let text = fallback_text(&err);
        assert!(text.starts_with("OCR processing failed:"));
        assert!(text.contains("tesseract exited with 1"));
    }

    #[tokio::test]
    async fn missing_document_fails_terminally() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let repo = MemoryRepo::default();
        let engine = MockOcr::default();

        let document_id = Uuid::new_v4();
        let err = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap_err();

        let TaskFailure::Terminal(reason) = err else {
            panic!("expected terminal failure");
        };
        assert!(reason.contains("not found"));
        assert!(reason.contains(&document_id.to_string()));
    }

    #[tokio::test]
    async fn missing_file_fails_terminally() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let document = Document {
            id: Uuid::new_v4(),
            path: dir.path().join("2026/03/14/gone.png").display().to_string(),
            doc_date: jiff::civil::date(2026, 3, 14).into(),
            created_at: jiff::Timestamp::now().into(),
        };
        let document_id = document.id;
        let repo = MemoryRepo::with_document(document);
        let engine = MockOcr::default();

        let err = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap_err();

        let TaskFailure::Terminal(reason) = err else {
            panic!("expected terminal failure");
        };
        assert!(reason.starts_with("file not found:"));
    }

    #[tokio::test]
    async fn missing_file_fails_even_when_text_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let document = Document {
            id: Uuid::new_v4(),
            path: dir.path().join("2026/03/14/gone.png").display().to_string(),
            doc_date: jiff::civil::date(2026, 3, 14).into(),
            created_at: jiff::Timestamp::now().into(),
        };
        let document_id = document.id;
        let repo = MemoryRepo::with_document(document);
        repo.attach(document_id, "earlier extraction");
        let engine = MockOcr::default();

        let err = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap_err();

        // The file check wins over the idempotent skip.
        let TaskFailure::Terminal(reason) = err else {
            panic!("expected terminal failure");
        };
        assert!(reason.starts_with("file not found:"));
    }

    #[tokio::test]
    async fn fresh_document_completes_and_attaches_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let document = stored_document(&store).await;
        let document_id = document.id;
        let repo = MemoryRepo::with_document(document);
        let engine = MockOcr::with_text("invoice total 42.00");

        let result = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap();

        assert_eq!(result.status, TaskResultStatus::Completed);
        assert_eq!(result.text_length, Some("invoice total 42.00".len()));
        assert_eq!(
            repo.text_for(document_id).as_deref(),
            Some("invoice total 42.00")
        );
    }

    #[tokio::test]
    async fn second_run_skips_processed_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let document = stored_document(&store).await;
        let document_id = document.id;
        let repo = MemoryRepo::with_document(document);
        let engine = MockOcr::with_text("first extraction");

        let first = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap();
        assert_eq!(first.status, TaskResultStatus::Completed);

        let second = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap();

        assert_eq!(second.status, TaskResultStatus::Skipped);
        assert_eq!(second.text_length, None);
        assert_eq!(repo.text_count(), 1);
        assert_eq!(repo.text_for(document_id).as_deref(), Some("first extraction"));
    }

    #[tokio::test]
    async fn lost_attach_race_reports_skip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let document = stored_document(&store).await;
        let document_id = document.id;
        let mut repo = MemoryRepo::with_document(document);
        repo.hide_existing_text = true;
        repo.attach(document_id, "winner's extraction");
        let engine = MockOcr::with_text("loser's extraction");

        let result = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap();

        // The CAS insert lost; the stored text is untouched.
        assert_eq!(result.status, TaskResultStatus::Skipped);
        assert_eq!(repo.text_count(), 1);
        assert_eq!(
            repo.text_for(document_id).as_deref(),
            Some("winner's extraction")
        );
    }

    #[tokio::test]
    async fn engine_failure_stores_diagnostic_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let document = stored_document(&store).await;
        let document_id = document.id;
        let repo = MemoryRepo::with_document(document);
        let engine = MockOcr::failing(ErrorKind::ExternalError);

        let result = execute_task(&repo, &store, &engine, &recognize_task(document_id))
            .await
            .unwrap();

        assert_eq!(result.status, TaskResultStatus::Completed);
        let stored = repo.text_for(document_id).unwrap();
        assert!(stored.starts_with("OCR processing failed:"));
    }
}
