//! Tesseract engine driven through the command-line binary.
//!
//! The engine pipes image bytes to `tesseract stdin stdout` and reads the
//! recognized text back, keeping the external engine fully out of process.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Ocr, Request, Response};
use crate::error::{Error, Result};
use crate::health::ServiceHealth;

/// Default recognition languages, matching the deployment's scanned corpus.
const DEFAULT_LANGUAGES: &str = "eng";

/// Tesseract OCR engine invoked as an external process.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    languages: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractOcr {
    /// Creates an engine that resolves `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            languages: DEFAULT_LANGUAGES.to_owned(),
        }
    }

    /// Overrides the tesseract binary location.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Sets the default recognition languages (`eng`, `eng+rus`, ...).
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }
}

impl Ocr for TesseractOcr {
    async fn recognize(&self, request: Request) -> Result<Response> {
        request.validate()?;

        let languages = request.languages.as_deref().unwrap_or(&self.languages);
        let start = std::time::Instant::now();

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::service_unavailable()
                    .with_message(format!("failed to spawn {}", self.binary.display()))
                    .with_source(e)
            })?;

        // stdin must be closed for tesseract to start processing.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&request.image_data)
                .await
                .map_err(|e| Error::external_error().with_source(e))?;
            stdin
                .shutdown()
                .await
                .map_err(|e| Error::external_error().with_source(e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::external_error().with_source(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::external_error()
                .with_message(format!("tesseract exited with {}: {}", output.status, stderr.trim())));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(Response::new(request.request_id, text).with_processing_time(start.elapsed()))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let start = std::time::Instant::now();
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let health = match output {
            Ok(output) if output.status.success() => {
                ServiceHealth::healthy().with_response_time(start.elapsed())
            }
            Ok(output) => ServiceHealth::unhealthy(format!(
                "tesseract --version exited with {}",
                output.status
            )),
            Err(e) => ServiceHealth::unhealthy(format!(
                "tesseract binary not available: {e}"
            )),
        };

        Ok(health)
    }
}
