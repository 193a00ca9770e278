//! Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::recognizer::{RawSpan, TextRecognizer};

/// PaddleOCR detection + recognition models run through `pure-onnx-ocr`.
///
/// The engine is not assumed to be reentrant, so calls are serialized.
pub struct PureOcrRecognizer {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    sort_reading_order: bool,
    row_tolerance: f32,
}

impl PureOcrRecognizer {
    /// Load the models named in `models` from `model_dir`.
    pub fn from_dir(
        model_dir: &Path,
        models: &ModelConfig,
        config: &OcrConfig,
    ) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            sort_reading_order: config.sort_reading_order,
            row_tolerance: config.row_tolerance.max(1.0),
        })
    }
}

impl TextRecognizer for PureOcrRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawSpan>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        // Detection model expects three channels
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

        let results = {
            let engine = self
                .engine
                .lock()
                .map_err(|_| OcrError::Recognition("recognizer lock poisoned".to_string()))?;
            engine
                .run_from_image(&rgb)
                .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?
        };

        let mut spans: Vec<(f32, f32, RawSpan)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                let text = r.text.replace("[UNK]", " ");
                (x, y, RawSpan::new(text, r.confidence))
            })
            .collect();

        if self.sort_reading_order {
            let tolerance = self.row_tolerance;
            spans.sort_by(|a, b| {
                let row_a = (a.1 / tolerance) as i32;
                let row_b = (b.1 / tolerance) as i32;
                if row_a != row_b {
                    row_a.cmp(&row_b)
                } else {
                    a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
                }
            });
        }

        debug!(
            "pure-onnx-ocr returned {} spans for {}x{} page in {}ms",
            spans.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(spans.into_iter().map(|(_, _, span)| span).collect())
    }
}

/// Smallest x and y over the first four polygon points.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::INFINITY, f32::INFINITY), |(min_x, min_y), coord| {
            (min_x.min(coord.x as f32), min_y.min(coord.y as f32))
        })
}
