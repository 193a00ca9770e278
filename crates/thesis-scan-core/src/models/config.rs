//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the thesis-scan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Image normalization configuration.
    pub normalizer: NormalizerConfig,

    /// Recognizer tuning configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// Tuning profile for the whole pipeline.
///
/// `LowResource` targets CPU-only hosts; `HighFidelity` assumes enough
/// headroom to keep more pixels and enlarge the page before recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TuningPreset {
    /// 800 px pages, no magnification, no confidence floor.
    ///
    /// The CPU pipeline this mirrors ran its detector with a 0.4 `mag_ratio`.
    /// That value scales an EasyOCR detection canvas and has no counterpart in
    /// the PaddleOCR detector, so magnification stays at 1.0 here.
    #[default]
    LowResource,
    /// 1024 px pages magnified 1.5x, with confidence floors of 0.2 (body)
    /// and 0.1 (keywords).
    HighFidelity,
}

impl std::fmt::Display for TuningPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningPreset::LowResource => write!(f, "low-resource"),
            TuningPreset::HighFidelity => write!(f, "high-fidelity"),
        }
    }
}

/// Image normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Pages wider than this are downscaled proportionally.
    pub max_width: u32,

    /// Median filter kernel size for body text (odd, 1 disables).
    pub median_kernel: u32,

    /// Bilateral filter diameter used in keyword mode.
    pub bilateral_diameter: u32,

    /// Bilateral filter intensity sigma.
    pub bilateral_sigma_color: f32,

    /// Bilateral filter spatial sigma.
    pub bilateral_sigma_space: f32,

    /// Binarize with Otsu's global threshold after denoising.
    pub binarize: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            median_kernel: 3,
            bilateral_diameter: 3,
            bilateral_sigma_color: 30.0,
            bilateral_sigma_space: 30.0,
            binarize: true,
        }
    }
}

/// Sensitivity parameters applied to one extraction mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionProfile {
    /// Scale factor applied to the page right before recognition.
    pub mag_ratio: f32,

    /// Spans recognized below this confidence are discarded.
    pub min_confidence: f32,
}

impl Default for RecognitionProfile {
    fn default() -> Self {
        Self {
            mag_ratio: 1.0,
            min_confidence: 0.0,
        }
    }
}

/// Recognizer tuning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Preset these values were derived from.
    pub preset: TuningPreset,

    /// Profile for paragraph text (title, program, abstract).
    pub body: RecognitionProfile,

    /// Profile for short, sparse keyword lists.
    pub keyword: RecognitionProfile,

    /// Sort recognized spans top-to-bottom, left-to-right.
    pub sort_reading_order: bool,

    /// Vertical distance (px) under which two spans share a row.
    pub row_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            preset: TuningPreset::LowResource,
            body: RecognitionProfile::default(),
            keyword: RecognitionProfile::default(),
            sort_reading_order: true,
            row_tolerance: 20.0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Abort the whole request when any payload fails to decode.
    pub strict_decode: bool,
}

/// Model file paths and URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Base URL that variant subdirectories are downloaded from.
    ///
    /// Unset by default: `models download` needs either this setting or
    /// `--base-url`. Files are fetched from `<base>/<variant>/<file name>`.
    pub download_base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            download_base_url: None,
        }
    }
}

impl ScanConfig {
    /// Build a configuration tuned for the given preset.
    pub fn for_preset(preset: TuningPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Overwrite the tunable constants with the values of `preset`.
    pub fn apply_preset(&mut self, preset: TuningPreset) {
        self.ocr.preset = preset;
        match preset {
            TuningPreset::LowResource => {
                self.normalizer.max_width = 800;
                self.ocr.body = RecognitionProfile::default();
                self.ocr.keyword = RecognitionProfile::default();
            }
            TuningPreset::HighFidelity => {
                self.normalizer.max_width = 1024;
                self.ocr.body = RecognitionProfile {
                    mag_ratio: 1.5,
                    min_confidence: 0.2,
                };
                self.ocr.keyword = RecognitionProfile {
                    mag_ratio: 1.5,
                    min_confidence: 0.1,
                };
            }
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}
