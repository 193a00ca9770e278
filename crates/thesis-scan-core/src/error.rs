//! Error types for the thesis-scan-core library.

use thiserror::Error;

/// Main error type for the thesis-scan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// A request arrived without any image payloads.
    #[error("no images supplied")]
    EmptyInput,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The payload is not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The recognizer capability failed on an image.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),
}

/// Result type for the thesis-scan library.
pub type Result<T> = std::result::Result<T, ScanError>;
