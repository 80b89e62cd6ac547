//! Document model for uploaded files awaiting or holding OCR results.

use std::path::Path;

use diesel::prelude::*;
use jiff_diesel::{Date, Timestamp};
use uuid::Uuid;

use crate::schema::documents;

/// A stored document: the on-disk location of an uploaded file plus the
/// date it was filed under.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// Path of the stored file on disk.
    pub path: String,
    /// Date the document was filed under.
    pub doc_date: Date,
    /// Timestamp when the document record was created.
    pub created_at: Timestamp,
}

/// Data for creating a new document record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocument {
    /// Path of the stored file.
    pub path: String,
    /// Date the document is filed under.
    pub doc_date: Date,
}

impl Document {
    /// Returns the file name component of the stored path.
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name().and_then(|n| n.to_str())
    }
}
