//! Sub-configuration structs with their defaults.

use crate::pipeline::transform::{AlphaPolarity, LumaParams, LumaWeights};
use serde::{Deserialize, Serialize};

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files converted concurrently
    pub parallel_workers: usize,

    /// Supported input extensions (case-insensitive, without the dot)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
                "tga".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 200,
            max_image_dimension: 20000,
        }
    }
}

/// Luminance to alpha mapping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Which end of the luminance range becomes opaque
    pub polarity: AlphaPolarity,

    /// Luminance below this stays fully opaque (bright_transparent only)
    pub threshold: u8,

    /// Red weight in the luminance sum
    pub weight_r: f32,

    /// Green weight in the luminance sum
    pub weight_g: f32,

    /// Blue weight in the luminance sum
    pub weight_b: f32,

    /// Multiply the computed alpha with the source alpha
    pub preserve_source_alpha: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        let weights = LumaWeights::default();
        Self {
            polarity: AlphaPolarity::BrightOpaque,
            threshold: 200,
            weight_r: weights.r,
            weight_g: weights.g,
            weight_b: weights.b,
            preserve_source_alpha: false,
        }
    }
}

impl TransformConfig {
    /// Build the transform parameters described by this section.
    pub fn params(&self) -> LumaParams {
        LumaParams {
            weights: LumaWeights {
                r: self.weight_r,
                g: self.weight_g,
                b: self.weight_b,
            },
            polarity: self.polarity,
            threshold: self.threshold,
            preserve_source_alpha: self.preserve_source_alpha,
        }
    }
}

/// Preview rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Checkerboard cell edge in pixels
    pub checker_size: u32,

    /// Gray level of the light cells
    pub light_tone: u8,

    /// Gray level of the dark cells
    pub dark_tone: u8,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            checker_size: 8,
            light_tone: 204,
            dark_tone: 153,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
