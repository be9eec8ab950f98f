//! Tesseract OCR calling the `tesseract` binary
//!
//! Uses whatever trained data the system has installed.

use super::{OcrProcessor, OcrRequest, OcrResult};
use crate::error::{ReaderError, ReaderResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_LANGUAGE: &str = "eng";

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            program: "tesseract".to_string(),
        }
    }

    /// Use a different tesseract executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, image: &Path, language: &str) -> ReaderResult<String> {
        debug!("Running {} on {:?} ({})", self.program, image, language);
        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ReaderError::Ocr(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(ReaderError::Ocr(format!(
                "{} failed with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl OcrProcessor for TesseractOcr {
    async fn submit(&self, request: OcrRequest) -> ReaderResult<OcrResult> {
        if !request.image.exists() {
            return Err(ReaderError::Ocr(format!(
                "image not found: {:?}",
                request.image
            )));
        }

        let language = match request.locale.iso639_3() {
            Some(language) => language,
            None => {
                warn!(
                    "⚠️ No OCR language for locale {}, will default to {}",
                    request.locale, DEFAULT_LANGUAGE
                );
                DEFAULT_LANGUAGE
            }
        };

        let text = match self.run(&request.image, language).await {
            Ok(text) => text,
            Err(e) if language != DEFAULT_LANGUAGE => {
                warn!(
                    "⚠️ OCR in {} failed ({}), trying {} as a fallback",
                    language, e, DEFAULT_LANGUAGE
                );
                self.run(&request.image, DEFAULT_LANGUAGE).await?
            }
            Err(e) => return Err(e),
        };

        info!("📝 OCR extracted {} chars", text.len());
        Ok(OcrResult { text })
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
