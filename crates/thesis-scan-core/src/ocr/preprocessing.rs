//! Image normalization ahead of text recognition.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::{bilateral_filter, median_filter};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::NormalizerConfig;

/// Turns raw page bytes into a bounded-width, denoised, binarized grayscale page.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    config: NormalizerConfig,
}

impl ImageNormalizer {
    /// Create a new normalizer with default settings.
    pub fn new() -> Self {
        Self::from_config(NormalizerConfig::default())
    }

    /// Create a normalizer from configuration.
    pub fn from_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, OcrError> {
        image::load_from_memory(bytes).map_err(|e| OcrError::Decode(e.to_string()))
    }

    /// Decode and normalize one page.
    pub fn normalize(&self, bytes: &[u8], keyword_mode: bool) -> Result<GrayImage, OcrError> {
        let image = self.decode(bytes)?;
        Ok(self.normalize_image(&image, keyword_mode))
    }

    /// Normalize an already decoded page.
    ///
    /// Keyword mode swaps the median filter for a small bilateral filter,
    /// which keeps the strokes of short tokens intact.
    pub fn normalize_image(&self, image: &DynamicImage, keyword_mode: bool) -> GrayImage {
        let (orig_width, orig_height) = image.dimensions();
        let (width, height) = self.target_dimensions(orig_width, orig_height);

        // Triangle support widens with the downscale ratio, averaging whole source areas
        let resized = if (width, height) != (orig_width, orig_height) {
            debug!(
                "Resizing page {}x{} -> {}x{}",
                orig_width, orig_height, width, height
            );
            image.resize_exact(width, height, FilterType::Triangle)
        } else {
            image.clone()
        };

        let gray = resized.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return gray;
        }

        let denoised = if keyword_mode {
            self.bilateral(&gray)
        } else {
            self.median(&gray)
        };

        if !self.config.binarize {
            return denoised;
        }

        let level = otsu_level(&denoised);
        debug!("Otsu threshold: {}", level);
        threshold(&denoised, level, ThresholdType::Binary)
    }

    /// Median denoise over a square `median_kernel` window.
    fn median(&self, gray: &GrayImage) -> GrayImage {
        let radius = self.config.median_kernel / 2;
        if radius == 0 {
            return gray.clone();
        }
        median_filter(gray, radius, radius)
    }

    /// Edge-preserving denoise used for keyword pages.
    fn bilateral(&self, gray: &GrayImage) -> GrayImage {
        if self.config.bilateral_diameter <= 1 {
            return gray.clone();
        }
        bilateral_filter(
            gray,
            self.config.bilateral_diameter,
            self.config.bilateral_sigma_color,
            self.config.bilateral_sigma_space,
        )
    }

    /// Width-bounded dimensions; height follows the same ratio, rounded.
    fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.config.max_width {
            return (width, height);
        }

        let scale = self.config.max_width as f64 / width as f64;
        let new_height = (height as f64 * scale).round() as u32;

        (self.config.max_width, new_height.max(1))
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
