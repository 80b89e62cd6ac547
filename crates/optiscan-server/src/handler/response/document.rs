//! Document response bodies.

use jiff::civil::Date;
use optiscan_postgres::model::{Document, DocumentText};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for a stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Identifier assigned to the document.
    pub document_id: Uuid,
    /// Path of the stored file.
    pub path: String,
    /// Date the document was filed under.
    pub doc_date: Date,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            document_id: document.id,
            doc_date: Date::from(document.doc_date),
            path: document.path,
        }
    }
}

/// Response carrying a document's extracted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTextResponse {
    /// Identifier of the document.
    pub doc_id: Uuid,
    /// The extracted text.
    pub text: String,
    /// Path of the stored file.
    pub path: String,
    /// Date the document was filed under.
    pub doc_date: Date,
}

impl DocumentTextResponse {
    /// Builds the response from a document and its attached text.
    pub fn new(document: Document, text: DocumentText) -> Self {
        Self {
            doc_id: document.id,
            text: text.text,
            doc_date: Date::from(document.doc_date),
            path: document.path,
        }
    }
}

/// Response for a document deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDocumentResponse {
    /// Identifier of the deleted document.
    pub doc_id: Uuid,
    /// Whether the stored file was removed from disk.
    pub file_deleted: bool,
    /// Path the file was stored at.
    pub path: String,
}
