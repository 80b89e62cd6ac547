//! Document repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Document, DocumentText, NewDocument};
use crate::{PgClient, PgError, PgResult, schema};

/// Repository for document database operations.
pub trait DocumentRepository {
    /// Creates a new document record.
    fn create_document(
        &self,
        new_document: NewDocument,
    ) -> impl Future<Output = PgResult<Document>> + Send;

    /// Finds a document by its unique identifier.
    fn find_document_by_id(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Document>>> + Send;

    /// Finds a document together with its extracted text, if any.
    fn find_document_with_text(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<(Document, Option<DocumentText>)>>> + Send;

    /// Deletes a document, returning the deleted record if it existed.
    ///
    /// Any attached text is removed by the foreign key cascade.
    fn delete_document(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Document>>> + Send;
}

impl DocumentRepository for PgClient {
    async fn create_document(&self, new_document: NewDocument) -> PgResult<Document> {
        let mut conn = self.get_connection().await?;

        use schema::documents;

        let document = diesel::insert_into(documents::table)
            .values(&new_document)
            .returning(Document::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn find_document_by_id(&self, document_id: Uuid) -> PgResult<Option<Document>> {
        let mut conn = self.get_connection().await?;

        use schema::documents::{self, dsl};

        let document = documents::table
            .filter(dsl::id.eq(document_id))
            .select(Document::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(document)
    }

    async fn find_document_with_text(
        &self,
        document_id: Uuid,
    ) -> PgResult<Option<(Document, Option<DocumentText>)>> {
        let mut conn = self.get_connection().await?;

        use schema::{document_texts, documents};

        let row = documents::table
            .left_join(document_texts::table)
            .filter(documents::dsl::id.eq(document_id))
            .select((
                Document::as_select(),
                Option::<DocumentText>::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(row)
    }

    async fn delete_document(&self, document_id: Uuid) -> PgResult<Option<Document>> {
        let mut conn = self.get_connection().await?;

        use schema::documents::{self, dsl};

        let document = diesel::delete(documents::table.filter(dsl::id.eq(document_id)))
            .returning(Document::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(document)
    }
}
