//! OCR pipeline: page normalization, recognition and line batching.

mod engine;
#[cfg(feature = "native")]
mod pure_engine;
mod preprocessing;
mod recognizer;

pub use engine::{ScanEngine, ScanEngineBuilder};
pub use preprocessing::ImageNormalizer;
pub use recognizer::{RawSpan, TextRecognizer, recognize_lines};

#[cfg(feature = "native")]
pub use engine::create_engine_from_dir;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;

use serde::{Deserialize, Serialize};

/// One recognized text span with its confidence.
///
/// `text` is always trimmed and non-empty; `confidence` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    pub confidence: f32,
}

impl RecognizedLine {
    /// Build a line, trimming `text`. Returns `None` when nothing is left.
    pub fn new(text: &str, confidence: f32) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

impl AsRef<str> for RecognizedLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Lines from every page of one request, merged in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineBatch {
    /// Recognized lines, page after page.
    pub lines: Vec<RecognizedLine>,

    /// Average line confidence of each page, 0 for pages without lines.
    pub image_confidences: Vec<f32>,
}

impl LineBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the lines of the next page.
    pub fn push_image(&mut self, lines: Vec<RecognizedLine>) {
        let average = if lines.is_empty() {
            0.0
        } else {
            lines.iter().map(|l| l.confidence).sum::<f32>() / lines.len() as f32
        };
        self.image_confidences.push(average);
        self.lines.extend(lines);
    }

    /// Record a page that contributed nothing (undecodable or unrecognizable).
    pub fn push_empty_image(&mut self) {
        self.push_image(Vec::new());
    }

    /// Number of pages accounted for.
    pub fn image_count(&self) -> usize {
        self.image_confidences.len()
    }

    /// Mean of the per-page confidences as a percentage, rounded to 2 decimals.
    pub fn accuracy(&self) -> f64 {
        if self.image_confidences.is_empty() {
            return 0.0;
        }
        let mean = self.image_confidences.iter().map(|&c| c as f64).sum::<f64>()
            / self.image_confidences.len() as f64;
        round2(mean * 100.0)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_spans_are_rejected() {
        assert!(RecognizedLine::new("   ", 0.9).is_none());
        assert!(RecognizedLine::new("", 0.9).is_none());

        let line = RecognizedLine::new("  Title \n", 0.75).unwrap();
        assert_eq!(line.text, "Title");
        assert_eq!(line.confidence, 0.75);
    }

    #[test]
    fn test_accuracy_averages_pages_not_lines() {
        let mut batch = LineBatch::new();
        batch.push_image(vec![
            RecognizedLine::new("a", 0.9).unwrap(),
            RecognizedLine::new("b", 0.7).unwrap(),
            RecognizedLine::new("c", 0.8).unwrap(),
        ]);
        batch.push_image(vec![RecognizedLine::new("d", 0.5).unwrap()]);

        // (0.8 + 0.5) / 2
        assert_eq!(batch.accuracy(), 65.0);
        assert_eq!(batch.lines.len(), 4);
    }

    #[test]
    fn test_empty_pages_count_as_zero() {
        let mut batch = LineBatch::new();
        batch.push_image(vec![RecognizedLine::new("a", 0.8123).unwrap()]);
        batch.push_empty_image();

        assert_eq!(batch.image_count(), 2);
        assert_eq!(batch.accuracy(), 40.62);
    }

    #[test]
    fn test_out_of_range_confidences_are_clamped() {
        let high = RecognizedLine::new("a", 1.3).unwrap();
        let low = RecognizedLine::new("b", -0.2).unwrap();
        assert_eq!(high.confidence, 1.0);
        assert_eq!(low.confidence, 0.0);

        let mut batch = LineBatch::new();
        batch.push_image(vec![high]);
        assert_eq!(batch.accuracy(), 100.0);

        batch.push_image(vec![low]);
        let accuracy = batch.accuracy();
        assert!((0.0..=100.0).contains(&accuracy));
        assert_eq!(accuracy, 50.0);
    }

    #[test]
    fn test_empty_batch_has_zero_accuracy() {
        assert_eq!(LineBatch::new().accuracy(), 0.0);
    }
}
