//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::types::SourceFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .processing
            .supported_formats
            .iter()
            .find(|ext| SourceFormat::from_extension(ext).is_none())
        {
            return Err(ConfigError::ValidationError(format!(
                "processing.supported_formats: no decoder for \"{ext}\""
            )));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        let t = &self.transform;
        for (name, weight) in [
            ("weight_r", t.weight_r),
            ("weight_g", t.weight_g),
            ("weight_b", t.weight_b),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::ValidationError(format!(
                    "transform.{name} must be between 0.0 and 1.0"
                )));
            }
        }
        if self.preview.checker_size == 0 {
            return Err(ConfigError::ValidationError(
                "preview.checker_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}
