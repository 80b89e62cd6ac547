//! Filesystem-backed content storage for uploaded document bytes.

mod content_store;

pub use content_store::{ContentStore, StoredFile, mime_type_for_path, sanitize_filename};
