//! Request bodies for the gateway routes.

mod document;

pub use document::CreateDocumentRequest;
