//! TuxReader Error Types
//!
//! Centralized error handling. Nothing in here is fatal to the host
//! process: the playback engine turns these into notifications.

use thiserror::Error;

/// Central error type for TuxReader
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Text-to-speech could not start: {0}")]
    BackendUnavailable(String),

    #[error("Failed to speak: {0}")]
    Utterance(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for TuxReader operations
pub type ReaderResult<T> = Result<T, ReaderError>;
