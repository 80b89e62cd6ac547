//! Extracted text model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::document_texts;

/// Text extracted from a document by the OCR worker.
///
/// At most one row exists per document; the unique constraint on
/// `document_id` is what makes reprocessing idempotent.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = document_texts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentText {
    /// Unique identifier for this text record.
    pub id: Uuid,
    /// Document this text belongs to.
    pub document_id: Uuid,
    /// The extracted text.
    pub text: String,
    /// Timestamp when the text was attached.
    pub created_at: Timestamp,
}

/// Data for attaching extracted text to a document.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_texts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentText {
    /// Document the text belongs to.
    pub document_id: Uuid,
    /// The extracted text.
    pub text: String,
}
