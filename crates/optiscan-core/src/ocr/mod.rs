//! OCR engine abstraction.
//!
//! The pipeline treats text recognition as a black box: image bytes go in,
//! a string comes out, or the engine reports a failure. The [`Ocr`] trait
//! captures that contract, [`OcrService`] adds retries and timeouts on top
//! of any implementation, and [`OcrEngine`] selects a concrete engine at
//! configuration time.

mod engine;
mod mock;
mod request;
mod response;
mod service;
mod tesseract;

pub use engine::OcrEngine;
pub use mock::MockOcr;
pub use request::Request;
pub use response::Response;
pub use service::OcrService;
pub use tesseract::TesseractOcr;

use crate::error::Result;
use crate::health::ServiceHealth;

/// Text recognition engine contract.
///
/// Implementations are expected to be cheap to clone or wrapped in
/// [`OcrService`], which shares the inner engine behind an `Arc`.
#[allow(async_fn_in_trait)]
pub trait Ocr {
    /// Runs text recognition on the request's image bytes.
    async fn recognize(&self, request: Request) -> Result<Response>;

    /// Checks whether the engine is operational.
    async fn health_check(&self) -> Result<ServiceHealth>;
}

/// Service wrapper around the configured engine.
pub type EngineService = OcrService<OcrEngine>;
