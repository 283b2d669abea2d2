//! PNG encoding with atomic replacement of the destination file.

use image::codecs::png::{CompressionType, FilterType, PngEncoder as ImagePngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::EncodeError;

use super::buffer::PixelBuffer;

/// Writes RGBA8 buffers as non-interlaced PNG files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl PngEncoder {
    /// Encode `buffer` into `path`, creating or overwriting it.
    ///
    /// The PNG is written to a temporary file next to `path` and renamed over
    /// it once complete; on any failure the temporary file is removed and
    /// `path` is left as it was.
    pub fn encode(buffer: &PixelBuffer, path: &Path) -> Result<(), EncodeError> {
        Self::stage(buffer, path)?.commit().map(|_| ())
    }

    /// Write the PNG for `path` to a temporary file without replacing `path`.
    ///
    /// Nothing becomes visible at `path` until [`StagedPng::commit`]; dropping
    /// the staged file deletes it.
    pub fn stage(buffer: &PixelBuffer, path: &Path) -> Result<StagedPng, EncodeError> {
        let io_err = |source: std::io::Error| EncodeError::IoFailure {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".lumalpha-")
            .suffix(".png.tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            Self::write_to(buffer, &mut writer, path)?;
            writer.flush().map_err(io_err)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;

        Ok(StagedPng {
            tmp,
            target: path.to_path_buf(),
        })
    }

    /// Encode `buffer` as PNG into memory.
    pub fn encode_to_vec(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = Vec::new();
        Self::write_to(buffer, &mut bytes, Path::new("<memory>"))?;
        Ok(bytes)
    }

    fn write_to<W: Write>(buffer: &PixelBuffer, writer: W, path: &Path) -> Result<(), EncodeError> {
        ImagePngEncoder::new_with_quality(writer, CompressionType::Fast, FilterType::Adaptive)
            .write_image(
                buffer.as_bytes(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| match e {
                image::ImageError::IoError(source) => EncodeError::IoFailure {
                    path: path.to_path_buf(),
                    source,
                },
                other => EncodeError::Png {
                    path: path.to_path_buf(),
                    message: other.to_string(),
                },
            })
    }
}

/// A fully written PNG waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedPng {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedPng {
    /// Final destination of the file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically move the PNG to its destination.
    pub fn commit(self) -> Result<PathBuf, EncodeError> {
        let Self { tmp, target } = self;
        tmp.persist(&target).map_err(|e| EncodeError::IoFailure {
            path: target.clone(),
            source: e.error,
        })?;
        tracing::trace!("Wrote {:?}", target);
        Ok(target)
    }
}
