//! OCR service wrapper with retry logic, timeouts, and observability.
//!
//! Wraps any [`Ocr`] implementation with production concerns: bounded
//! retries for transient failures, a per-request timeout, and tracing.
//! The inner engine is shared behind an `Arc`, so the wrapper is cheap to
//! clone into worker tasks.

use std::sync::Arc;
use std::time::Duration;

use super::{Ocr, Request, Response};
use crate::error::{Error, Result};
use crate::health::ServiceHealth;
use crate::TRACING_TARGET_OCR;

/// OCR service wrapper with additional functionality.
#[derive(Debug, Clone)]
pub struct OcrService<T> {
    inner: Arc<T>,
    retry_attempts: u32,
    timeout: Duration,
    service_name: String,
}

impl<T> OcrService<T> {
    /// Creates a new service wrapper with default configuration:
    /// 3 attempts, 30 second timeout.
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
            retry_attempts: 3,
            timeout: Duration::from_secs(30),
            service_name: "ocr-service".to_owned(),
        }
    }

    /// Sets the number of attempts for failed requests.
    ///
    /// Only retryable errors (timeouts, transient engine failures) are
    /// retried; validation errors fail immediately.
    pub fn with_retry_policy(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Sets the timeout for a single recognition attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the service name used in logs.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Returns a reference to the inner engine.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> Ocr for OcrService<T>
where
    T: Ocr + Send + Sync,
{
    async fn recognize(&self, request: Request) -> Result<Response> {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            tracing::debug!(
                target: TRACING_TARGET_OCR,
                service = %self.service_name,
                request_id = %request.request_id,
                attempt,
                attempts = self.retry_attempts,
                "processing OCR request"
            );

            let start = std::time::Instant::now();

            match tokio::time::timeout(self.timeout, self.inner.recognize(request.clone())).await {
                Ok(Ok(response)) => {
                    tracing::debug!(
                        target: TRACING_TARGET_OCR,
                        service = %self.service_name,
                        request_id = %request.request_id,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "OCR request succeeded"
                    );
                    return Ok(response);
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        target: TRACING_TARGET_OCR,
                        service = %self.service_name,
                        request_id = %request.request_id,
                        attempt,
                        error = %error,
                        "OCR request failed"
                    );

                    if !error.is_retryable() || attempt == self.retry_attempts {
                        return Err(error);
                    }

                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                    last_error = Some(error);
                }
                Err(_) => {
                    tracing::warn!(
                        target: TRACING_TARGET_OCR,
                        service = %self.service_name,
                        request_id = %request.request_id,
                        attempt,
                        timeout_secs = self.timeout.as_secs(),
                        "OCR request timed out"
                    );

                    let error = Error::timeout();
                    if attempt == self.retry_attempts {
                        return Err(error);
                    }

                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(Error::internal_error))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::MockOcr;

    #[tokio::test]
    async fn passes_through_success() {
        let service = OcrService::new(MockOcr::with_text("recognized"));
        let response = service
            .recognize(Request::new(&b"img"[..], "image/png"))
            .await
            .unwrap();
        assert_eq!(response.text, "recognized");
    }

    #[tokio::test]
    async fn does_not_retry_validation_errors() {
        let service = OcrService::new(MockOcr::with_text("unused")).with_retry_policy(3);
        // Empty payload fails validation inside the mock engine.
        let err = service
            .recognize(Request::new(bytes::Bytes::new(), "image/png"))
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }
}
