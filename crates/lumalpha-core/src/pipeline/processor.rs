//! Per-file orchestration: decode, transform, encode.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::error::DecodeError;
use crate::types::{DisplayMode, ImageSource, ProcessFunction, TransformOutcome, TransformResult};

use super::batch::CancelToken;
use super::buffer::PixelBuffer;
use super::decode::ImageDecoder;
use super::encode::{PngEncoder, StagedPng};
use super::preview::{PreviewCompositor, PreviewPair};
use super::transform::LuminanceAlphaTransform;

/// Converts single images. Shared read-only by batch workers.
pub struct ImageProcessor {
    decoder: ImageDecoder,
    transform: LuminanceAlphaTransform,
    compositor: PreviewCompositor,
}

impl ImageProcessor {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            transform: LuminanceAlphaTransform::new(config.transform.params()),
            compositor: PreviewCompositor::new(&config.preview),
        }
    }

    /// Run the processing function over a decoded buffer.
    pub fn apply(&self, buffer: PixelBuffer, function: ProcessFunction) -> PixelBuffer {
        match function {
            ProcessFunction::LumaToAlpha => self.transform.apply(&buffer),
            ProcessFunction::ConvertToPng => buffer,
        }
    }

    /// Convert one source, leaving the PNG staged next to
    /// `output_folder/<stem>.png` until the result is committed.
    ///
    /// Never fails: every error is captured in the returned result. `cancel`
    /// is checked before decoding and before encoding; once set, the file is
    /// abandoned and nothing is written.
    pub fn stage(
        &self,
        index: usize,
        source: &ImageSource,
        output_folder: &Path,
        function: ProcessFunction,
        cancel: &CancelToken,
    ) -> StagedResult {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", source.path);

        let staged = self.convert(source, output_folder, function, cancel);
        match &staged {
            Staged::Ready(png) => {
                tracing::debug!("Converted {:?} -> {:?} in {:?}", source.path, png.target(), start.elapsed());
            }
            Staged::Failed(failure) => {
                tracing::warn!("Failed: {:?} - {}", source.path, failure.detail());
            }
            Staged::Abandoned => {
                tracing::debug!("Abandoned {:?} after cancellation", source.path);
            }
        }

        StagedResult {
            index,
            source: source.path.clone(),
            staged,
        }
    }

    fn convert(
        &self,
        source: &ImageSource,
        output_folder: &Path,
        function: ProcessFunction,
        cancel: &CancelToken,
    ) -> Staged {
        if cancel.is_cancelled() {
            return Staged::Abandoned;
        }

        let decode_start = Instant::now();
        let decoded = match self.decoder.decode_detailed(&source.path) {
            Ok(decoded) => decoded,
            Err(e) => return Staged::Failed(e.into()),
        };
        tracing::trace!(
            "  Decode: {:?} ({} {}x{}, {} bytes)",
            decode_start.elapsed(),
            decoded.format,
            decoded.buffer.width(),
            decoded.buffer.height(),
            decoded.file_size
        );

        let transform_start = Instant::now();
        let processed = self.apply(decoded.buffer, function);
        tracing::trace!("  Transform: {:?}", transform_start.elapsed());

        if cancel.is_cancelled() {
            return Staged::Abandoned;
        }

        let encode_start = Instant::now();
        let output = output_path(source, output_folder);
        match PngEncoder::stage(&processed, &output) {
            Ok(png) => {
                tracing::trace!("  Encode: {:?}", encode_start.elapsed());
                Staged::Ready(png)
            }
            Err(e) => Staged::Failed(e.into()),
        }
    }

    /// Render the before/after preview panes for one image.
    ///
    /// "Before" is the decoded source in [`DisplayMode::Normal`]; "after" is
    /// the processed buffer in `mode`.
    pub fn preview(
        &self,
        path: &Path,
        mode: DisplayMode,
        function: ProcessFunction,
    ) -> Result<PreviewPair, DecodeError> {
        let original = self.decoder.decode(path)?;
        let before = self.compositor.render(&original, DisplayMode::Normal);
        let processed = self.apply(original, function);
        let after = self.compositor.render(&processed, mode);
        Ok(PreviewPair { before, after })
    }
}

/// Where a file got to before its result is committed.
#[derive(Debug)]
pub enum Staged {
    /// PNG written to a temporary file
    Ready(StagedPng),
    /// Failed at some stage; nothing on disk
    Failed(TransformOutcome),
    /// Cancelled before it finished; nothing on disk
    Abandoned,
}

/// Per-file output of [`ImageProcessor::stage`].
#[derive(Debug)]
pub struct StagedResult {
    index: usize,
    source: PathBuf,
    staged: Staged,
}

impl StagedResult {
    /// Move a staged PNG into place and produce the file's result.
    ///
    /// Returns `None` for an abandoned file. Dropping a `StagedResult`
    /// without committing deletes any staged PNG.
    pub fn commit(self) -> Option<TransformResult> {
        let outcome = match self.staged {
            Staged::Ready(png) => match png.commit() {
                Ok(output) => TransformOutcome::Success { output },
                Err(e) => {
                    tracing::warn!("Failed: {:?} - {}", self.source, e);
                    e.into()
                }
            },
            Staged::Failed(outcome) => outcome,
            Staged::Abandoned => return None,
        };
        Some(TransformResult {
            index: self.index,
            source: self.source,
            outcome,
        })
    }
}

/// Destination of a source inside the output folder: `<stem>.png`.
pub fn output_path(source: &ImageSource, output_folder: &Path) -> PathBuf {
    let stem = source
        .path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "image".into());
    let mut name = stem;
    name.push(".png");
    output_folder.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceFormat;
    use image::{Rgba, RgbaImage};

    fn source(path: PathBuf) -> ImageSource {
        let format = SourceFormat::from_path(&path).unwrap();
        ImageSource { path, format }
    }

    fn process(
        processor: &ImageProcessor,
        index: usize,
        src: ImageSource,
        output_folder: &Path,
        function: ProcessFunction,
    ) -> TransformResult {
        processor
            .stage(index, &src, output_folder, function, &CancelToken::new())
            .commit()
            .unwrap()
    }

    #[test]
    fn test_output_path_replaces_extension() {
        let src = source(PathBuf::from("/in/photo.final.JPG"));
        assert_eq!(
            output_path(&src, Path::new("/out")),
            PathBuf::from("/out/photo.final.png")
        );
    }

    #[test]
    fn test_process_writes_transformed_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("white.bmp");
        image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]))
            .save(&input)
            .unwrap();
        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let processor = ImageProcessor::new(&Config::default());
        let result = process(&processor, 0, source(input), &out_dir, ProcessFunction::LumaToAlpha);

        let expected = out_dir.join("white.png");
        assert_eq!(
            result.outcome,
            TransformOutcome::Success {
                output: expected.clone()
            }
        );
        let written = image::open(&expected).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_convert_to_png_keeps_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dark.png");
        RgbaImage::from_pixel(1, 1, Rgba([10, 10, 10, 200]))
            .save(&input)
            .unwrap();
        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let processor = ImageProcessor::new(&Config::default());
        let result = process(&processor, 3, source(input), &out_dir, ProcessFunction::ConvertToPng);
        assert!(result.is_success());
        assert_eq!(result.index, 3);

        let written = image::open(out_dir.join("dark.png")).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(0, 0).0, [10, 10, 10, 200]);
    }

    #[test]
    fn test_process_captures_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"definitely not a png").unwrap();

        let processor = ImageProcessor::new(&Config::default());
        let result = process(&processor, 0, source(input), dir.path(), ProcessFunction::LumaToAlpha);
        assert!(matches!(result.outcome, TransformOutcome::DecodeError { .. }));
        assert!(!dir.path().join("broken.png.png").exists());
    }

    #[test]
    fn test_process_captures_encode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ok.png");
        RgbaImage::new(1, 1).save(&input).unwrap();

        let processor = ImageProcessor::new(&Config::default());
        let missing = dir.path().join("missing");
        let result = process(&processor, 0, source(input), &missing, ProcessFunction::LumaToAlpha);
        assert!(matches!(result.outcome, TransformOutcome::EncodeError { .. }));
    }

    #[test]
    fn test_cancelled_file_is_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("skip.png");
        RgbaImage::new(2, 2).save(&input).unwrap();
        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let processor = ImageProcessor::new(&Config::default());
        let staged = processor.stage(
            0,
            &source(input),
            &out_dir,
            ProcessFunction::LumaToAlpha,
            &cancel,
        );
        assert!(staged.commit().is_none());
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_uncommitted_stage_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("held.png");
        RgbaImage::new(2, 2).save(&input).unwrap();
        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let processor = ImageProcessor::new(&Config::default());
        let staged = processor.stage(
            0,
            &source(input),
            &out_dir,
            ProcessFunction::LumaToAlpha,
            &CancelToken::new(),
        );
        drop(staged);
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_preview_pair() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.png");
        image::GrayImage::from_pixel(2, 2, image::Luma([100]))
            .save(&input)
            .unwrap();

        let processor = ImageProcessor::new(&Config::default());
        let pair = processor
            .preview(&input, DisplayMode::AlphaOnly, ProcessFunction::LumaToAlpha)
            .unwrap();
        assert_eq!(pair.before.pixel(0, 0), Some([100, 100, 100, 255]));
        assert_eq!(pair.after.pixel(0, 0), Some([100, 100, 100, 255]));

        let pair = processor
            .preview(&input, DisplayMode::Normal, ProcessFunction::LumaToAlpha)
            .unwrap();
        assert_eq!(pair.after.pixel(1, 1), Some([100, 100, 100, 100]));
    }
}
