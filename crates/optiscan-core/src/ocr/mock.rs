//! Mock engine for tests and engine-less deployments.

use super::{Ocr, Request, Response};
use crate::error::{Error, ErrorKind, Result};
use crate::health::ServiceHealth;

/// Mock OCR engine returning canned results.
///
/// Validates requests like a real engine would, then either echoes the
/// configured text or fails with the configured error kind.
#[derive(Debug, Clone)]
pub struct MockOcr {
    text: String,
    fail_with: Option<ErrorKind>,
}

impl Default for MockOcr {
    fn default() -> Self {
        Self::with_text("mock recognized text")
    }
}

impl MockOcr {
    /// Creates a mock engine that returns the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fail_with: None,
        }
    }

    /// Creates a mock engine that fails every request with the given kind.
    pub fn failing(kind: ErrorKind) -> Self {
        Self {
            text: String::new(),
            fail_with: Some(kind),
        }
    }
}

impl Ocr for MockOcr {
    async fn recognize(&self, request: Request) -> Result<Response> {
        request.validate()?;

        if let Some(kind) = self.fail_with {
            return Err(Error::new(kind).with_message("mock engine failure"));
        }

        Ok(Response::new(request.request_id, self.text.clone()))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(match self.fail_with {
            Some(_) => ServiceHealth::unhealthy("mock engine configured to fail"),
            None => ServiceHealth::healthy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_text() {
        let engine = MockOcr::with_text("invoice total 42.00");
        let request = Request::new(&b"img"[..], "image/png");
        let request_id = request.request_id;

        let response = engine.recognize(request).await.unwrap();
        assert_eq!(response.request_id, request_id);
        assert_eq!(response.text, "invoice total 42.00");
    }

    #[tokio::test]
    async fn fails_with_configured_kind() {
        let engine = MockOcr::failing(ErrorKind::ExternalError);
        let err = engine
            .recognize(Request::new(&b"img"[..], "image/png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalError);
    }
}
