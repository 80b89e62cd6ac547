//! Document ingestion, retrieval and deletion handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use optiscan_core::fs::ContentStore;
use optiscan_postgres::PgClient;
use optiscan_postgres::model::NewDocument;
use optiscan_postgres::query::DocumentRepository;
use uuid::Uuid;
use validator::Validate;

use super::request::CreateDocumentRequest;
use super::response::{DeleteDocumentResponse, DocumentResponse, DocumentTextResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for document operations.
const TRACING_TARGET: &str = "optiscan_server::handler::documents";

/// `POST /documents`
///
/// Decodes the uploaded content, writes it to the content store, and
/// records the document. If the metadata insert fails the written file is
/// left behind for external cleanup; nothing is partially recorded.
#[tracing::instrument(skip_all, target = TRACING_TARGET)]
async fn create_document(
    State(postgres): State<PgClient>,
    State(content_store): State<ContentStore>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>)> {
    request.validate().map_err(|e| {
        ErrorKind::BadRequest
            .with_message("Invalid document upload")
            .with_context(e.to_string())
    })?;

    let bytes = request.decode_content()?;
    let doc_date = request.doc_date_or_today();

    let stored = content_store
        .store(&request.filename, doc_date, &bytes)
        .await?;

    let document = postgres
        .create_document(NewDocument {
            path: stored.path_str(),
            doc_date: doc_date.into(),
        })
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        document_id = %document.id,
        path = %document.path,
        size_bytes = stored.size_bytes,
        "Stored document"
    );

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// `GET /documents/{document_id}/text`
///
/// A missing document and a document whose text is not extracted yet are
/// both 404, with distinct error bodies.
#[tracing::instrument(skip(postgres), target = TRACING_TARGET)]
async fn get_document_text(
    State(postgres): State<PgClient>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentTextResponse>> {
    let (document, text) = postgres
        .find_document_with_text(document_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_resource("document"))?;

    let text = text.ok_or_else(|| ErrorKind::TextNotReady.with_resource("document_text"))?;

    Ok(Json(DocumentTextResponse::new(document, text)))
}

/// `DELETE /documents/{document_id}`
///
/// Metadata deletion commits first (text rows cascade); file removal is
/// best effort afterwards and never undoes the committed delete.
#[tracing::instrument(skip(postgres, content_store), target = TRACING_TARGET)]
async fn delete_document(
    State(postgres): State<PgClient>,
    State(content_store): State<ContentStore>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DeleteDocumentResponse>> {
    let document = postgres
        .delete_document(document_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_resource("document"))?;

    let file_deleted = content_store.remove(&document.path).await;

    tracing::info!(
        target: TRACING_TARGET,
        document_id = %document.id,
        file_deleted,
        "Deleted document"
    );

    Ok(Json(DeleteDocumentResponse {
        doc_id: document.id,
        file_deleted,
        path: document.path,
    }))
}

/// Returns a [`Router`] with all document routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/documents", post(create_document))
        .route("/documents/{document_id}/text", get(get_document_text))
        .route("/documents/{document_id}", delete(delete_document))
}
