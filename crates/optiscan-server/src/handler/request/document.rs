//! Document request bodies.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handler::{ErrorKind, Result};

/// Request to store a new document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    /// Name the file should be stored under; directory components are
    /// stripped before storage.
    #[validate(length(min = 1, max = 255))]
    pub filename: String,

    /// Base64-encoded file content. A `data:` URL prefix is tolerated and
    /// stripped before decoding.
    #[validate(length(min = 1))]
    pub content: String,

    /// Date to file the document under; defaults to today.
    pub doc_date: Option<Date>,
}

impl CreateDocumentRequest {
    /// Decodes the base64 content into raw bytes.
    pub fn decode_content(&self) -> Result<Vec<u8>> {
        let encoded = match self.content.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.content.as_str(),
        };

        STANDARD.decode(encoded.trim()).map_err(|e| {
            ErrorKind::BadRequest
                .with_message("Content is not valid base64")
                .with_context(e.to_string())
        })
    }

    /// Returns the requested date, falling back to today.
    pub fn doc_date_or_today(&self) -> Date {
        self.doc_date
            .unwrap_or_else(|| jiff::Zoned::now().date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> CreateDocumentRequest {
        CreateDocumentRequest {
            filename: "scan.png".to_owned(),
            content: content.to_owned(),
            doc_date: None,
        }
    }

    #[test]
    fn decodes_plain_base64() {
        let decoded = request("aGVsbG8=").decode_content().unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn strips_data_url_prefix() {
        let decoded = request("data:image/png;base64,aGVsbG8=")
            .decode_content()
            .unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(request("not base64!!!").decode_content().is_err());
    }

    #[test]
    fn validates_filename_length() {
        let mut req = request("aGVsbG8=");
        req.filename = String::new();
        assert!(req.validate().is_err());
    }
}
