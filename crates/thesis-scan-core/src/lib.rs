//! Core library for thesis metadata extraction from scanned pages.
//!
//! This crate provides:
//! - Page normalization (resize, denoise, Otsu binarization)
//! - A text recognition seam with a `pure-onnx-ocr` backed implementation
//! - Rule-based extraction of title, authors, program, date, abstract and keywords
//! - Thesis catalogue records assembled from the extraction steps

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;

pub use error::{OcrError, Result, ScanError};
pub use extraction::{ExtractedFields, ExtractionMode, ExtractionResult, extract_fields};
pub use models::config::{ScanConfig, TuningPreset};
pub use models::record::{RecordPages, ThesisRecord};
pub use ocr::{
    ImageNormalizer, LineBatch, RawSpan, RecognizedLine, ScanEngine, ScanEngineBuilder,
    TextRecognizer,
};
#[cfg(feature = "native")]
pub use ocr::{PureOcrRecognizer, create_engine_from_dir};
