//! Image decoding with format sniffing, size limits and RGBA normalization.

use image::{DynamicImage, ImageError};
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::DecodeError;
use crate::types::SourceFormat;

use super::buffer::PixelBuffer;
use super::validate::Validator;

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    validator: Validator,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// Normalized RGBA pixels
    pub buffer: PixelBuffer,
    /// Format the bytes were decoded as
    pub format: SourceFormat,
    /// Original file size in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits),
        }
    }

    /// Decode a file into a normalized RGBA buffer.
    pub fn decode(&self, path: &Path) -> Result<PixelBuffer, DecodeError> {
        self.decode_detailed(path).map(|decoded| decoded.buffer)
    }

    /// Decode a file, keeping the detected format and file size.
    pub fn decode_detailed(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        self.validator.check_size(path)?;
        let bytes = std::fs::read(path).map_err(|e| DecodeError::IoFailure {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.decode_bytes(&bytes, path)
    }

    /// Decode an in-memory file. `path` is used for extension fallback and
    /// error context only.
    pub fn decode_bytes(&self, bytes: &[u8], path: &Path) -> Result<DecodedImage, DecodeError> {
        let format = Validator::resolve_format(path, bytes)?;
        let image = image::load_from_memory_with_format(bytes, format.image_format())
            .map_err(|e| map_image_error(e, path, format))?;

        self.validator
            .check_dimensions(path, image.width(), image.height())?;

        let buffer = normalize(image).map_err(|(w, h)| DecodeError::Corrupt {
            path: path.to_path_buf(),
            message: format!("empty image ({w}x{h})"),
        })?;

        Ok(DecodedImage {
            buffer,
            format,
            file_size: bytes.len() as u64,
        })
    }
}

/// Convert any decoded colour type to RGBA8.
///
/// Gray sources replicate their level into R, G and B; sources without alpha
/// become fully opaque; 16-bit and float samples are scaled down to 8 bits.
fn normalize(image: DynamicImage) -> Result<PixelBuffer, (u32, u32)> {
    let rgba = match image {
        DynamicImage::ImageRgba8(rgba) => rgba,
        other => other.to_rgba8(),
    };
    PixelBuffer::try_from(rgba)
}

fn map_image_error(err: ImageError, path: &Path, format: SourceFormat) -> DecodeError {
    match err {
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: format!("{format} ({e})"),
        },
        // Bytes are already in memory, so an I/O error here is a truncated stream.
        other => DecodeError::Corrupt {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn decoder() -> ImageDecoder {
        ImageDecoder::new(LimitsConfig::default())
    }

    #[test]
    fn test_decode_rgba_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();

        let decoded = decoder().decode_detailed(&path).unwrap();
        assert_eq!(decoded.format, SourceFormat::Png);
        assert_eq!((decoded.buffer.width(), decoded.buffer.height()), (3, 2));
        assert_eq!(decoded.buffer.pixel(2, 1), Some([10, 20, 30, 40]));
    }

    #[test]
    fn test_grayscale_is_replicated_and_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(2, 2, Luma([77])).save(&path).unwrap();

        let buffer = decoder().decode(&path).unwrap();
        assert_eq!(buffer.pixel(1, 1), Some([77, 77, 77, 255]));
    }

    #[test]
    fn test_rgb_bmp_gets_opaque_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.bmp");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
            .save_with_format(&path, ImageFormat::Bmp)
            .unwrap();

        let buffer = decoder().decode(&path).unwrap();
        assert_eq!(buffer.pixel(0, 0), Some([1, 2, 3, 255]));
    }

    #[test]
    fn test_tga_and_tiff_decode() {
        let dir = tempfile::tempdir().unwrap();
        let tga = dir.path().join("a.tga");
        let tiff = dir.path().join("a.tif");
        let img = RgbaImage::from_pixel(2, 3, Rgba([200, 100, 50, 255]));
        img.save_with_format(&tga, ImageFormat::Tga).unwrap();
        img.save_with_format(&tiff, ImageFormat::Tiff).unwrap();

        assert_eq!(
            decoder().decode(&tga).unwrap().pixel(1, 2),
            Some([200, 100, 50, 255])
        );
        let decoded = decoder().decode_detailed(&tiff).unwrap();
        assert_eq!(decoded.format, SourceFormat::Tiff);
        assert_eq!(decoded.buffer.pixel(0, 0), Some([200, 100, 50, 255]));
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes under a .jpg name still decode as PNG
        let dir = tempfile::tempdir().unwrap();
        let misnamed = dir.path().join("misnamed.jpg");
        RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 9]))
            .save_with_format(&misnamed, ImageFormat::Png)
            .unwrap();

        let decoded = decoder().decode_detailed(&misnamed).unwrap();
        assert_eq!(decoded.format, SourceFormat::Png);
    }

    #[test]
    fn test_truncated_png_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.png");
        RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 4]))
            .save(&path)
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let truncated = &bytes[..bytes.len() / 2];

        let err = decoder().decode_bytes(truncated, &path).unwrap_err();
        assert!(matches!(err, DecodeError::Corrupt { .. }), "{err:?}");
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let err = decoder().decode(Path::new("/no/such/file.png")).unwrap_err();
        assert!(matches!(err, DecodeError::IoFailure { .. }));
    }

    #[test]
    fn test_dimension_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbaImage::new(64, 1).save(&path).unwrap();

        let decoder = ImageDecoder::new(LimitsConfig {
            max_file_size_mb: 10,
            max_image_dimension: 32,
        });
        assert!(matches!(
            decoder.decode(&path),
            Err(DecodeError::TooLarge { .. })
        ));
    }
}
