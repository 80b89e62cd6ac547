//! Database models for documents and their extracted text.

mod document;
mod document_text;

pub use document::{Document, NewDocument};
pub use document_text::{DocumentText, NewDocumentText};
