//! Scan engine: normalizes pages, recognizes them and extracts fields.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{Result, ScanError};
use crate::extraction::{ExtractionMode, ExtractionResult};
use crate::models::config::{RecognitionProfile, ScanConfig};
use crate::models::record::{RecordPages, ThesisRecord};

use super::{ImageNormalizer, LineBatch, TextRecognizer, recognize_lines};

/// Stateless extraction entry point sharing one recognizer handle.
///
/// Cloning is cheap; clones share the recognizer.
#[derive(Clone)]
pub struct ScanEngine {
    recognizer: Arc<dyn TextRecognizer>,
    normalizer: ImageNormalizer,
    config: ScanConfig,
}

/// Builder for ScanEngine.
pub struct ScanEngineBuilder {
    recognizer: Option<Arc<dyn TextRecognizer>>,
    config: ScanConfig,
}

impl ScanEngineBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            recognizer: None,
            config: ScanConfig::default(),
        }
    }

    /// Set the text recognizer.
    pub fn with_recognizer<R: TextRecognizer + 'static>(mut self, recognizer: R) -> Self {
        self.recognizer = Some(Arc::new(recognizer));
        self
    }

    /// Set an already shared text recognizer.
    pub fn with_shared_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Set configuration.
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the scan engine.
    pub fn build(self) -> Result<ScanEngine> {
        let recognizer = self
            .recognizer
            .ok_or_else(|| ScanError::Config("no text recognizer configured".to_string()))?;

        Ok(ScanEngine {
            recognizer,
            normalizer: ImageNormalizer::from_config(self.config.normalizer.clone()),
            config: self.config,
        })
    }
}

impl Default for ScanEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanEngine {
    /// Create a new builder.
    pub fn builder() -> ScanEngineBuilder {
        ScanEngineBuilder::new()
    }

    /// Active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn profile(&self, mode: ExtractionMode) -> &RecognitionProfile {
        if mode.is_keyword_mode() {
            &self.config.ocr.keyword
        } else {
            &self.config.ocr.body
        }
    }

    /// Recognize every page of a request into one merged batch.
    ///
    /// Pages are handled one by one in submission order. A page that fails
    /// to decode (unless `strict_decode` is set) or to recognize contributes
    /// no lines and zero confidence.
    pub fn recognize<B: AsRef<[u8]>>(&self, mode: ExtractionMode, images: &[B]) -> Result<LineBatch> {
        if images.is_empty() {
            return Err(ScanError::EmptyInput);
        }

        let keyword_mode = mode.is_keyword_mode();
        let profile = self.profile(mode);
        let mut batch = LineBatch::new();

        for (index, bytes) in images.iter().enumerate() {
            let page = match self.normalizer.normalize(bytes.as_ref(), keyword_mode) {
                Ok(page) => page,
                Err(e) if self.config.extraction.strict_decode => {
                    return Err(ScanError::Ocr(e));
                }
                Err(e) => {
                    warn!("Skipping image {}: {}", index + 1, e);
                    batch.push_empty_image();
                    continue;
                }
            };

            let page = DynamicImage::ImageLuma8(page);
            match recognize_lines(self.recognizer.as_ref(), &page, profile) {
                Ok(lines) => {
                    debug!("Image {}: {} lines", index + 1, lines.len());
                    batch.push_image(lines);
                }
                Err(e) => {
                    warn!("Recognition failed for image {}: {}", index + 1, e);
                    batch.push_empty_image();
                }
            }
        }

        Ok(batch)
    }

    /// Run a full extraction request.
    pub fn extract<B: AsRef<[u8]>>(
        &self,
        mode: ExtractionMode,
        images: &[B],
    ) -> Result<ExtractionResult> {
        let start = Instant::now();
        let batch = self.recognize(mode, images)?;
        let result = ExtractionResult::from_batch(mode, &batch);

        info!(
            "{} extraction: {} images, {} lines, accuracy {:.2} in {}ms",
            mode,
            batch.image_count(),
            batch.lines.len(),
            result.accuracy,
            start.elapsed().as_millis()
        );

        Ok(result)
    }

    /// Run every mode that has pages and assemble a catalogue record.
    pub fn scan_record<B: AsRef<[u8]>>(&self, pages: &RecordPages<B>) -> Result<ThesisRecord> {
        let mut results = Vec::new();

        for mode in ExtractionMode::ALL {
            let images = pages.pages(mode);
            if images.is_empty() {
                debug!("No pages for {}, skipping", mode);
                continue;
            }
            results.push(self.extract(mode, images)?);
        }

        if results.is_empty() {
            return Err(ScanError::EmptyInput);
        }

        Ok(ThesisRecord::from_results(&results))
    }
}

/// Convenience function to create a scan engine with models from a directory.
#[cfg(feature = "native")]
pub fn create_engine_from_dir(
    model_dir: &std::path::Path,
    config: ScanConfig,
) -> std::result::Result<ScanEngine, crate::error::OcrError> {
    use super::PureOcrRecognizer;
    use crate::error::OcrError;

    let recognizer = PureOcrRecognizer::from_dir(model_dir, &config.models, &config.ocr)?;

    ScanEngine::builder()
        .with_recognizer(recognizer)
        .with_config(config)
        .build()
        .map_err(|e| OcrError::ModelLoad(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::extraction::ExtractedFields;
    use crate::models::config::TuningPreset;
    use crate::ocr::RawSpan;
    use image::{GenericImageView, GrayImage, Luma};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Recognizer keyed by page width, so each synthetic page maps to fixed spans.
    struct StubRecognizer {
        pages: HashMap<u32, Vec<RawSpan>>,
        calls: Mutex<Vec<u32>>,
    }

    impl StubRecognizer {
        fn new(pages: Vec<(u32, Vec<(&str, f32)>)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(width, spans)| {
                        let spans = spans
                            .into_iter()
                            .map(|(text, conf)| RawSpan::new(text, conf))
                            .collect();
                        (width, spans)
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextRecognizer for StubRecognizer {
        fn recognize(&self, image: &DynamicImage) -> std::result::Result<Vec<RawSpan>, OcrError> {
            let width = image.dimensions().0;
            self.calls.lock().unwrap().push(width);
            self.pages
                .get(&width)
                .cloned()
                .ok_or_else(|| OcrError::Recognition(format!("no page of width {}", width)))
        }
    }

    fn png(width: u32) -> Vec<u8> {
        let page = GrayImage::from_fn(width, 20, |x, _| {
            if x % 7 == 0 { Luma([10]) } else { Luma([240]) }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(page)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn engine(recognizer: StubRecognizer) -> ScanEngine {
        ScanEngine::builder()
            .with_recognizer(recognizer)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_recognizer() {
        assert!(matches!(
            ScanEngine::builder().build(),
            Err(ScanError::Config(_))
        ));
    }

    #[test]
    fn test_no_images_is_an_error() {
        let engine = engine(StubRecognizer::new(Vec::new()));
        let images: Vec<Vec<u8>> = Vec::new();

        let err = engine.extract(ExtractionMode::Abstract, &images).unwrap_err();
        assert!(matches!(err, ScanError::EmptyInput));
    }

    #[test]
    fn test_pages_merged_in_submission_order() {
        let engine = engine(StubRecognizer::new(vec![
            (101, vec![("A Study of Rivers", 0.9)]),
            (102, vec![("Smith, John", 0.7), ("  ", 0.1)]),
        ]));

        let result = engine
            .extract(ExtractionMode::TitleAuthors, &[png(101), png(102)])
            .unwrap();

        assert_eq!(
            result.fields,
            ExtractedFields::TitleAuthors {
                title: Some("A Study of Rivers".to_string()),
                authors: Some("Smith, John".to_string()),
            }
        );
        assert_eq!(result.accuracy, 80.0);
    }

    #[test]
    fn test_undecodable_page_contributes_nothing() {
        let engine = engine(StubRecognizer::new(vec![(
            101,
            vec![("Keywords: cats; dogs", 0.9), ("birds", 0.9), ("Abstract", 0.9)],
        )]));

        let images = vec![png(101), b"not an image".to_vec()];
        let result = engine.extract(ExtractionMode::Keywords, &images).unwrap();

        assert_eq!(result.field("keywords"), Some("cats, dogs, birds"));
        assert_eq!(result.accuracy, 45.0);
    }

    #[test]
    fn test_strict_mode_aborts_on_undecodable_page() {
        let mut config = ScanConfig::default();
        config.extraction.strict_decode = true;

        let engine = ScanEngine::builder()
            .with_recognizer(StubRecognizer::new(vec![(101, vec![("x", 0.9)])]))
            .with_config(config)
            .build()
            .unwrap();

        let images = vec![png(101), b"not an image".to_vec()];
        let err = engine.extract(ExtractionMode::Abstract, &images).unwrap_err();
        assert!(matches!(err, ScanError::Ocr(OcrError::Decode(_))));
    }

    #[test]
    fn test_recognition_failure_degrades_page() {
        // Width 103 is unknown to the stub, so recognition fails for that page
        let engine = engine(StubRecognizer::new(vec![(
            101,
            vec![("Department of Computer Studies College of Engineering", 1.0), ("March 2024", 1.0)],
        )]));

        let result = engine
            .extract(ExtractionMode::ProgramDate, &[png(101), png(103)])
            .unwrap();

        assert_eq!(result.field("program_course"), Some("BSCS, College of Engineering"));
        assert_eq!(result.field("date_published"), Some("March 2024"));
        assert_eq!(result.accuracy, 50.0);
    }

    #[test]
    fn test_pages_without_text_yield_nulls() {
        let engine = engine(StubRecognizer::new(vec![(101, Vec::new()), (102, vec![(" ", 0.9)])]));

        for mode in ExtractionMode::ALL {
            let result = engine.extract(mode, &[png(101), png(102)]).unwrap();
            assert!(result.fields.is_empty());
            assert_eq!(result.accuracy, 0.0);
        }
    }

    #[test]
    fn test_wide_pages_are_normalized_before_recognition() {
        let recognizer = Arc::new(StubRecognizer::new(vec![(800, vec![("Abstract body", 0.6)])]));
        let engine = ScanEngine::builder()
            .with_shared_recognizer(recognizer.clone())
            .build()
            .unwrap();

        let result = engine.extract(ExtractionMode::Abstract, &[png(1600)]).unwrap();

        assert_eq!(result.field("abstract"), Some("Abstract body."));
        assert_eq!(*recognizer.calls.lock().unwrap(), vec![800]);
    }

    #[test]
    fn test_keyword_profile_used_for_keyword_mode() {
        let recognizer = Arc::new(StubRecognizer::new(vec![
            (101, vec![("Keywords: rivers", 0.15)]),
            (152, vec![("Keywords: rivers", 0.15)]),
        ]));
        let engine = ScanEngine::builder()
            .with_shared_recognizer(recognizer.clone())
            .with_config(ScanConfig::for_preset(TuningPreset::HighFidelity))
            .build()
            .unwrap();

        // 101 px magnified by 1.5 in both profiles
        let keywords = engine.extract(ExtractionMode::Keywords, &[png(101)]).unwrap();
        let abstract_ = engine.extract(ExtractionMode::Abstract, &[png(101)]).unwrap();

        // Keyword floor 0.1 keeps the span, body floor 0.2 drops it
        assert_eq!(keywords.field("keywords"), Some("rivers"));
        assert_eq!(abstract_.accuracy, 0.0);
        assert_eq!(*recognizer.calls.lock().unwrap(), vec![152, 152]);
    }

    #[test]
    fn test_scan_record_runs_modes_with_pages() {
        let engine = engine(StubRecognizer::new(vec![
            (101, vec![("A Study of Rivers", 0.9), ("Smith, John", 0.9)]),
            (102, vec![("Department of Information Technology", 0.8), ("June 2019", 0.8)]),
        ]));

        let pages = RecordPages {
            title_authors: vec![png(101)],
            program_date: vec![png(102)],
            abstract_text: Vec::new(),
            keywords: Vec::new(),
        };

        let record = engine.scan_record(&pages).unwrap();
        assert_eq!(record.title.as_deref(), Some("A Study of Rivers"));
        assert_eq!(record.program_course.as_deref(), Some("BSIT"));
        assert_eq!(record.date_published.as_deref(), Some("June 2019"));
        assert_eq!(record.abstract_text, None);
        assert_eq!(record.accuracy, 85.0);
    }

    #[test]
    fn test_scan_record_without_pages() {
        let engine = engine(StubRecognizer::new(Vec::new()));
        let pages: RecordPages<Vec<u8>> = RecordPages::default();

        assert!(matches!(engine.scan_record(&pages), Err(ScanError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_recognizer() {
        let recognizer = Arc::new(StubRecognizer::new(vec![
            (101, vec![("Keywords: cats; dogs", 0.9), ("birds", 0.9)]),
            (102, vec![("This is a study", 0.6), ("Keywords: x", 0.6)]),
        ]));
        let engine = ScanEngine::builder()
            .with_shared_recognizer(recognizer.clone())
            .build()
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                if i % 2 == 0 {
                    engine.extract(ExtractionMode::Keywords, &[png(101)])
                } else {
                    engine.extract(ExtractionMode::Abstract, &[png(102)])
                }
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.unwrap().unwrap();
            if i % 2 == 0 {
                assert_eq!(result.field("keywords"), Some("cats, dogs, birds"));
            } else {
                assert_eq!(result.field("abstract"), Some("This is a study."));
            }
        }

        assert_eq!(recognizer.calls.lock().unwrap().len(), 8);
    }
}
