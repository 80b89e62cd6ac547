//! Extracted text repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{DocumentText, NewDocumentText};
use crate::{PgClient, PgError, PgResult, schema};

/// Outcome of attaching extracted text to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAttachOutcome {
    /// The text was stored; this worker won the attach.
    Attached,
    /// Text already exists for the document, the new text was discarded.
    AlreadyProcessed,
}

/// Repository for extracted text database operations.
pub trait DocumentTextRepository {
    /// Attaches extracted text to a document.
    ///
    /// Exactly one attach wins per document: concurrent or redelivered
    /// attempts observe [`TextAttachOutcome::AlreadyProcessed`] instead of
    /// overwriting the stored text.
    fn attach_document_text(
        &self,
        new_text: NewDocumentText,
    ) -> impl Future<Output = PgResult<TextAttachOutcome>> + Send;

    /// Finds the extracted text for a document, if any.
    fn find_text_by_document_id(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<DocumentText>>> + Send;
}

impl DocumentTextRepository for PgClient {
    async fn attach_document_text(
        &self,
        new_text: NewDocumentText,
    ) -> PgResult<TextAttachOutcome> {
        let mut conn = self.get_connection().await?;

        use schema::document_texts::{self, dsl};

        // ON CONFLICT DO NOTHING makes the unique constraint the arbiter,
        // so the attach is race-free without an explicit transaction.
        let inserted = diesel::insert_into(document_texts::table)
            .values(&new_text)
            .on_conflict(dsl::document_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(PgError::from)?;

        Ok(if inserted > 0 {
            TextAttachOutcome::Attached
        } else {
            TextAttachOutcome::AlreadyProcessed
        })
    }

    async fn find_text_by_document_id(
        &self,
        document_id: Uuid,
    ) -> PgResult<Option<DocumentText>> {
        let mut conn = self.get_connection().await?;

        use schema::document_texts::{self, dsl};

        let text = document_texts::table
            .filter(dsl::document_id.eq(document_id))
            .select(DocumentText::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(text)
    }
}
