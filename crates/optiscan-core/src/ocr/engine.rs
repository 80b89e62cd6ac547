//! Engine selection.

use std::str::FromStr;

use super::{MockOcr, Ocr, Request, Response, TesseractOcr};
use crate::error::{Error, Result};
use crate::health::ServiceHealth;

/// Concrete OCR engine chosen at configuration time.
///
/// `async fn` traits are not object safe, so the configured engine is an
/// enum rather than a trait object.
#[derive(Debug, Clone)]
pub enum OcrEngine {
    /// External tesseract process.
    Tesseract(TesseractOcr),
    /// Canned results, for tests and local development.
    Mock(MockOcr),
}

impl Default for OcrEngine {
    fn default() -> Self {
        Self::Tesseract(TesseractOcr::new())
    }
}

impl FromStr for OcrEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tesseract" => Ok(Self::Tesseract(TesseractOcr::new())),
            "mock" => Ok(Self::Mock(MockOcr::default())),
            other => {
                Err(Error::invalid_input().with_message(format!("unknown OCR engine: {other}")))
            }
        }
    }
}

impl Ocr for OcrEngine {
    async fn recognize(&self, request: Request) -> Result<Response> {
        match self {
            Self::Tesseract(engine) => engine.recognize(request).await,
            Self::Mock(engine) => engine.recognize(request).await,
        }
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        match self {
            Self::Tesseract(engine) => engine.health_check().await,
            Self::Mock(engine) => engine.health_check().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_names() {
        assert!(matches!(
            "tesseract".parse::<OcrEngine>(),
            Ok(OcrEngine::Tesseract(_))
        ));
        assert!(matches!("mock".parse::<OcrEngine>(), Ok(OcrEngine::Mock(_))));
        assert!("unknown".parse::<OcrEngine>().is_err());
    }
}
