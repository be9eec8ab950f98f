//! OCR (Optical Character Recognition) Module
//!
//! Images go in, text comes out. The reader only consumes the text, which
//! it hands to the playback engine.

use crate::error::ReaderResult;
use crate::locale::Locale;
use async_trait::async_trait;
use std::path::PathBuf;

pub mod tesseract;

/// An image to read, with the language it is most likely written in
#[derive(Debug, Clone)]
pub struct OcrRequest {
    pub image: PathBuf,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrResult {
    pub text: String,
}

/// Trait for OCR processors
#[async_trait]
pub trait OcrProcessor: Send + Sync + std::fmt::Debug {
    /// Extract the text of an image
    async fn submit(&self, request: OcrRequest) -> ReaderResult<OcrResult>;

    /// Get the processor name
    fn name(&self) -> &str;
}
