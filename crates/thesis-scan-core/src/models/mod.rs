//! Configuration and record data models.

pub mod config;
pub mod record;

pub use config::{
    ExtractionConfig, ModelConfig, NormalizerConfig, OcrConfig, RecognitionProfile, ScanConfig,
    TuningPreset,
};
pub use record::{RecordPages, StepAccuracy, ThesisRecord};
