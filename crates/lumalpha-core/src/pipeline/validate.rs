//! Input validation before decoding: size limit and signature sniffing.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::DecodeError;
use crate::types::SourceFormat;

/// Validates files before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check the on-disk size of a file against the configured limit.
    pub fn check_size(&self, path: &Path) -> Result<u64, DecodeError> {
        let metadata = std::fs::metadata(path).map_err(|e| DecodeError::IoFailure {
            path: path.to_path_buf(),
            source: e,
        })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(DecodeError::TooLarge {
                path: path.to_path_buf(),
                detail: format!(
                    "{}MB > {}MB",
                    metadata.len() / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            });
        }
        Ok(metadata.len())
    }

    /// Check decoded dimensions against the configured limit.
    pub fn check_dimensions(&self, path: &Path, width: u32, height: u32) -> Result<(), DecodeError> {
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(DecodeError::TooLarge {
                path: path.to_path_buf(),
                detail: format!("{width}x{height} > {max_dim}"),
            });
        }
        Ok(())
    }

    /// Work out which decoder to use for `bytes`.
    ///
    /// The signature wins over the extension. TGA has no signature, so it is
    /// only recognized by extension.
    pub fn resolve_format(path: &Path, bytes: &[u8]) -> Result<SourceFormat, DecodeError> {
        if let Some(format) = Self::sniff(bytes) {
            return Ok(format);
        }
        match SourceFormat::from_path(path) {
            Some(SourceFormat::Tga) => Ok(SourceFormat::Tga),
            Some(format) => Err(DecodeError::Corrupt {
                path: path.to_path_buf(),
                message: format!("missing {format} signature"),
            }),
            None => Err(DecodeError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            }),
        }
    }

    /// Match the header bytes against known signatures.
    pub fn sniff(header: &[u8]) -> Option<SourceFormat> {
        match header {
            // PNG: 89 50 4E 47 0D 0A 1A 0A
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(SourceFormat::Png),
            // JPEG: FF D8 FF
            [0xFF, 0xD8, 0xFF, ..] => Some(SourceFormat::Jpeg),
            // TIFF: II (little-endian) or MM (big-endian) followed by version 42
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => {
                Some(SourceFormat::Tiff)
            }
            // BMP: BM
            [b'B', b'M', ..] => Some(SourceFormat::Bmp),
            _ => None,
        }
    }
}
