//! TuxReader Library
//!
//! Core modules for the TuxReader screen reader: OCR text goes in, speech
//! comes out, with the spoken fragment reported for highlighting.

pub mod config;
pub mod error;
pub mod locale;
pub mod notify;
pub mod ocr;
pub mod speech;
pub mod tts;
