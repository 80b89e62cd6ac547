//! Request types for OCR operations.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Image formats the pipeline accepts for recognition.
const SUPPORTED_FORMATS: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/tiff",
    "image/bmp",
    "image/webp",
    "application/pdf",
];

/// Maximum image size accepted by the engine: 10MB.
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Request for an OCR operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// Image data to process.
    pub image_data: Bytes,
    /// MIME type of the image.
    pub mime_type: String,
    /// Recognition languages, engine-specific (e.g. `eng+rus`).
    /// Falls back to the engine default when unset.
    pub languages: Option<String>,
}

impl Request {
    /// Creates a new OCR request.
    pub fn new(image_data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            image_data: image_data.into(),
            mime_type: mime_type.into(),
            languages: None,
        }
    }

    /// Sets the recognition languages.
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = Some(languages.into());
        self
    }

    /// Validates the request before it reaches the engine.
    pub fn validate(&self) -> Result<()> {
        if self.image_data.is_empty() {
            return Err(Error::invalid_input().with_message("image data must not be empty"));
        }

        if self.mime_type.is_empty() {
            return Err(Error::invalid_input().with_message("mime type must not be empty"));
        }

        if !SUPPORTED_FORMATS.contains(&self.mime_type.as_str()) {
            return Err(
                Error::unsupported_format().with_message(format!("unsupported: {}", self.mime_type))
            );
        }

        if self.image_data.len() > MAX_IMAGE_SIZE {
            return Err(Error::invalid_input().with_message(format!(
                "image exceeds maximum size of {} bytes",
                MAX_IMAGE_SIZE
            )));
        }

        Ok(())
    }

    /// Returns the size of the image data in bytes.
    #[inline]
    pub fn image_size(&self) -> usize {
        self.image_data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_formats() {
        assert!(Request::new(&b"png"[..], "image/png").validate().is_ok());
        assert!(
            Request::new(&b"pdf"[..], "application/pdf")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert!(Request::new(Bytes::new(), "image/png").validate().is_err());
        assert!(Request::new(&b"x"[..], "").validate().is_err());
        assert!(
            Request::new(&b"x"[..], "text/plain")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn rejects_oversized_images() {
        let data = vec![0u8; MAX_IMAGE_SIZE + 1];
        assert!(Request::new(data, "image/png").validate().is_err());
    }
}
