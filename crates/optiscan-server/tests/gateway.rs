//! Gateway tests against live Postgres and NATS.
//!
//! These run only when `POSTGRES_URL` and `NATS_URL` point at reachable
//! services (a `.env` file is honored); without them every test skips.

use axum_test::TestServer;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use optiscan_nats::NatsConfig;
use optiscan_postgres::{PgConfig, run_pending_migrations};
use optiscan_server::handler::routes;
use optiscan_server::service::{ServiceConfig, ServiceState};
use tempfile::TempDir;
use uuid::Uuid;

/// Bundles the test server with the content dir keeping it alive.
struct Gateway {
    server: TestServer,
    _content_dir: TempDir,
}

async fn gateway() -> Option<Gateway> {
    dotenvy::dotenv().ok();
    let postgres_url = std::env::var("POSTGRES_URL").ok()?;
    let nats_url = std::env::var("NATS_URL").ok()?;
    let nats_token = std::env::var("NATS_TOKEN").unwrap_or_default();

    let postgres = PgConfig::new(postgres_url);
    let client = postgres.clone().build().expect("database client");
    run_pending_migrations(&client).await.expect("migrations");

    let content_dir = tempfile::tempdir().expect("content dir");
    let config = ServiceConfig::new(postgres, NatsConfig::new(nats_url, nats_token))
        .with_content_dir(content_dir.path().display().to_string());

    let state = ServiceState::from_config(&config)
        .await
        .expect("service state");
    let server = TestServer::new(routes().with_state(state)).expect("test server");

    Some(Gateway {
        server,
        _content_dir: content_dir,
    })
}

fn upload_body(filename: &str) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "content": STANDARD.encode(b"scanned page bytes"),
    })
}

#[tokio::test]
async fn uploaded_document_text_is_not_ready() {
    let Some(gateway) = gateway().await else {
        eprintln!("skipping: POSTGRES_URL/NATS_URL not set");
        return;
    };

    let response = gateway.server.post("/documents").json(&upload_body("scan.png")).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    let document_id = created["document_id"].as_str().unwrap().to_owned();

    // No worker has run; the text endpoint reports not-ready, not missing.
    let response = gateway
        .server
        .get(&format!("/documents/{document_id}/text"))
        .await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "text_not_ready");
}

#[tokio::test]
async fn dispatch_on_missing_document_is_not_found() {
    let Some(gateway) = gateway().await else {
        eprintln!("skipping: POSTGRES_URL/NATS_URL not set");
        return;
    };

    let response = gateway
        .server
        .post(&format!("/documents/{}/analyze", Uuid::new_v4()))
        .await;
    response.assert_status_not_found();

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "not_found");
    assert_eq!(body["resource"], "document");
}

#[tokio::test]
async fn deleted_document_reads_are_not_found() {
    let Some(gateway) = gateway().await else {
        eprintln!("skipping: POSTGRES_URL/NATS_URL not set");
        return;
    };

    let response = gateway.server.post("/documents").json(&upload_body("gone.png")).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    let document_id = created["document_id"].as_str().unwrap().to_owned();

    let response = gateway
        .server
        .delete(&format!("/documents/{document_id}"))
        .await;
    response.assert_status_ok();
    let deleted: serde_json::Value = response.json();
    assert_eq!(deleted["file_deleted"], true);

    let response = gateway
        .server
        .get(&format!("/documents/{document_id}/text"))
        .await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "not_found");

    let response = gateway
        .server
        .delete(&format!("/documents/{document_id}"))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn health_reports_operational_services() {
    let Some(gateway) = gateway().await else {
        eprintln!("skipping: POSTGRES_URL/NATS_URL not set");
        return;
    };

    let response = gateway.server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "OK");
    let services = body["services"].as_array().unwrap();
    assert_eq!(services.len(), 2);
}
