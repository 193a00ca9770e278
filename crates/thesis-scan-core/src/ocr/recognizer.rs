//! Adapter around the external text recognition capability.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, trace};

use crate::error::OcrError;
use crate::models::config::RecognitionProfile;

use super::RecognizedLine;

/// A raw span as reported by a recognizer, before cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpan {
    /// Recognized text, possibly padded or blank.
    pub text: String,
    /// Recognizer confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl RawSpan {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Trait for text recognition backends.
///
/// One handle is loaded at startup and shared by every request, so
/// implementations must be safe to call from several threads at once.
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text spans of a page, in detection order.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawSpan>, OcrError>;
}

/// Run `recognizer` on a normalized page and clean up its output.
///
/// The page is magnified by `profile.mag_ratio` first. Spans that are blank
/// after trimming or fall below `profile.min_confidence` are dropped.
pub fn recognize_lines(
    recognizer: &dyn TextRecognizer,
    image: &DynamicImage,
    profile: &RecognitionProfile,
) -> Result<Vec<RecognizedLine>, OcrError> {
    let magnified;
    let page = if (profile.mag_ratio - 1.0).abs() > f32::EPSILON && profile.mag_ratio > 0.0 {
        let (width, height) = image.dimensions();
        let new_width = ((width as f32 * profile.mag_ratio).round() as u32).max(1);
        let new_height = ((height as f32 * profile.mag_ratio).round() as u32).max(1);
        trace!("Magnifying page to {}x{}", new_width, new_height);
        magnified = image.resize_exact(new_width, new_height, FilterType::Lanczos3);
        &magnified
    } else {
        image
    };

    let spans = recognizer.recognize(page)?;
    let span_count = spans.len();

    let lines: Vec<RecognizedLine> = spans
        .into_iter()
        .filter(|span| span.confidence >= profile.min_confidence)
        .filter_map(|span| RecognizedLine::new(&span.text, span.confidence))
        .collect();

    debug!("Kept {} of {} recognized spans", lines.len(), span_count);

    Ok(lines)
}
