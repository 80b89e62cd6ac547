//! End-to-end pipeline test against live Postgres and NATS.
//!
//! Drives the full flow through the HTTP surface: upload, dispatch, worker
//! recognition with the mock engine, status polling, and text retrieval.
//! Runs only when `POSTGRES_URL` and `NATS_URL` point at reachable services
//! (a `.env` file is honored); otherwise it skips.

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use optiscan_nats::NatsConfig;
use optiscan_postgres::{PgConfig, run_pending_migrations};
use optiscan_server::handler::routes;
use optiscan_server::service::{ServiceConfig, ServiceState};
use optiscan_worker::{RecognitionWorker, WorkerConfig, WorkerState};
use tokio_util::sync::CancellationToken;

async fn poll_until_terminal(server: &TestServer, task_id: &str) -> serde_json::Value {
    for _ in 0..100 {
        let response = server.get(&format!("/tasks/{task_id}")).await;
        if response.status_code() == StatusCode::OK {
            let body: serde_json::Value = response.json();
            if body["status"] == "succeeded" || body["status"] == "failed" {
                return body;
            }
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    panic!("task {task_id} did not reach a terminal state");
}

#[tokio::test]
async fn document_flows_from_upload_to_extracted_text() {
    dotenvy::dotenv().ok();
    let (Ok(postgres_url), Ok(nats_url)) =
        (std::env::var("POSTGRES_URL"), std::env::var("NATS_URL"))
    else {
        eprintln!("skipping: POSTGRES_URL/NATS_URL not set");
        return;
    };
    let nats_token = std::env::var("NATS_TOKEN").unwrap_or_default();

    let postgres = PgConfig::new(postgres_url);
    let nats = NatsConfig::new(nats_url, nats_token);

    let client = postgres.clone().build().expect("database client");
    run_pending_migrations(&client).await.expect("migrations");

    let content_dir = tempfile::tempdir().expect("content dir");
    let content_dir_path = content_dir.path().display().to_string();

    // Worker and gateway share the content directory, as in production.
    let mut worker_config =
        WorkerConfig::new(postgres.clone(), nats.clone()).with_content_dir(&content_dir_path);
    worker_config.ocr_engine = "mock".to_owned();

    let worker_state = WorkerState::from_config(&worker_config)
        .await
        .expect("worker state");
    let cancel_token = CancellationToken::new();
    let worker =
        RecognitionWorker::new(worker_state, "pipeline-test-worker", cancel_token.clone()).spawn();

    let service_config = ServiceConfig::new(postgres, nats).with_content_dir(&content_dir_path);
    let state = ServiceState::from_config(&service_config)
        .await
        .expect("service state");
    let server = TestServer::new(routes().with_state(state)).expect("test server");

    // Upload.
    let response = server
        .post("/documents")
        .json(&serde_json::json!({
            "filename": "pipeline.png",
            "content": STANDARD.encode(b"scanned page bytes"),
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    let document_id = created["document_id"].as_str().unwrap().to_owned();

    // Dispatch and wait for the worker.
    let response = server
        .post(&format!("/documents/{document_id}/analyze"))
        .await;
    response.assert_status(StatusCode::ACCEPTED);
    let dispatched: serde_json::Value = response.json();
    let task_id = dispatched["task_id"].as_str().unwrap().to_owned();

    let terminal = poll_until_terminal(&server, &task_id).await;
    assert_eq!(terminal["status"], "succeeded");
    assert_eq!(terminal["result"]["status"], "completed");

    // The extracted text is readable through the gateway.
    let response = server
        .get(&format!("/documents/{document_id}/text"))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["doc_id"].as_str().unwrap(), document_id);
    assert!(!body["text"].as_str().unwrap().is_empty());

    // A second dispatch is an idempotent skip, not a second extraction.
    let response = server
        .post(&format!("/documents/{document_id}/analyze"))
        .await;
    response.assert_status(StatusCode::ACCEPTED);
    let redispatched: serde_json::Value = response.json();
    let retry_task_id = redispatched["task_id"].as_str().unwrap().to_owned();
    assert_ne!(retry_task_id, task_id);

    let terminal = poll_until_terminal(&server, &retry_task_id).await;
    assert_eq!(terminal["status"], "succeeded");
    assert_eq!(terminal["result"]["status"], "skipped");

    // Cleanup.
    let response = server
        .delete(&format!("/documents/{document_id}"))
        .await;
    response.assert_status_ok();

    cancel_token.cancel();
    worker
        .await
        .expect("worker join")
        .expect("worker shutdown");
}
