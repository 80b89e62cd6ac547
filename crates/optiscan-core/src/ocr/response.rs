//! Response types for OCR operations.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response from an OCR operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Unique identifier for this response.
    pub response_id: Uuid,
    /// Request ID this response corresponds to.
    pub request_id: Uuid,
    /// Extracted text content.
    pub text: String,
    /// Engine processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Timestamp when recognition completed.
    pub completed_at: Timestamp,
}

impl Response {
    /// Creates a new response for the given request.
    pub fn new(request_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            response_id: Uuid::new_v4(),
            request_id,
            text: text.into(),
            processing_time_ms: 0,
            completed_at: Timestamp::now(),
        }
    }

    /// Sets the engine processing time.
    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time_ms = elapsed.as_millis() as u64;
        self
    }

    /// Returns the number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Returns whether the extraction produced no usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words() {
        let response = Response::new(Uuid::new_v4(), "hello scanned  world\n");
        assert_eq!(response.word_count(), 3);
        assert!(!response.is_empty());
    }

    #[test]
    fn whitespace_only_is_empty() {
        let response = Response::new(Uuid::new_v4(), " \n\t ");
        assert!(response.is_empty());
    }
}
