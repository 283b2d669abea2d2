//! Core data types shared by discovery, the batch runner and the preview path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DecodeError, EncodeError};

/// Source container formats with a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Png,
    Jpeg,
    Tiff,
    Tga,
    Bmp,
}

impl SourceFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "tga" => Some(Self::Tga),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::Tga => image::ImageFormat::Tga,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
            Self::Tga => "tga",
            Self::Bmp => "bmp",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered input file. Readability is only checked at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Format inferred from the extension
    pub format: SourceFormat,
}

impl ImageSource {
    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Processing function applied between decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessFunction {
    /// Recompute alpha from luminance
    #[default]
    LumaToAlpha,
    /// Re-encode the normalized RGBA buffer as PNG, pixels untouched
    ConvertToPng,
}

/// How the preview compositor presents a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// RGBA as-is
    #[default]
    Normal,
    /// Alpha channel as opaque grayscale
    AlphaOnly,
    /// Composited over a two-tone checkerboard
    Checkerboard,
}

/// What a conversion request points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    SingleFile(PathBuf),
    Folder(PathBuf),
}

impl InputSpec {
    /// Classify a path by what currently exists on disk. Anything that is not
    /// a directory is treated as a single file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::Folder(path)
        } else {
            Self::SingleFile(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::SingleFile(path) | Self::Folder(path) => path,
        }
    }
}

/// Inbound request describing one batch run.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    pub input: InputSpec,
    pub output_folder: PathBuf,
    pub function: ProcessFunction,
}

/// Outcome of one file, tagged by the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransformOutcome {
    Success { output: PathBuf },
    DecodeError { detail: String },
    TransformError { detail: String },
    EncodeError { detail: String },
    IoError { detail: String },
}

impl TransformOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Human-readable description of the outcome.
    pub fn detail(&self) -> String {
        match self {
            Self::Success { output } => format!("written to {}", output.display()),
            Self::DecodeError { detail }
            | Self::TransformError { detail }
            | Self::EncodeError { detail }
            | Self::IoError { detail } => detail.clone(),
        }
    }
}

impl From<DecodeError> for TransformOutcome {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::IoFailure { .. } => Self::IoError {
                detail: err.to_string(),
            },
            _ => Self::DecodeError {
                detail: err.to_string(),
            },
        }
    }
}

impl From<EncodeError> for TransformOutcome {
    fn from(err: EncodeError) -> Self {
        Self::EncodeError {
            detail: err.to_string(),
        }
    }
}

/// Result of processing one source, keyed by its submission index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
    /// Position of the source in the submitted sequence
    pub index: usize,
    /// Source file path
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: TransformOutcome,
}

impl TransformResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Progress event emitted once per completed file, in submission order.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Submission index of the completed file
    pub index: usize,
    /// Number of sources handed to the run
    pub total: usize,
    /// What happened to the file
    pub outcome: TransformResult,
}

/// Terminal state of a run that started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every attempted file converted
    Succeeded,
    /// The run finished but some files failed
    CompletedWithErrors,
    /// The run was cancelled before all sources were dispatched
    Cancelled,
}

/// Ordered per-file results of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Results in submission order
    pub results: Vec<TransformResult>,

    /// Files converted successfully
    pub succeeded: usize,

    /// Files that failed at any stage
    pub failed: usize,

    /// Files attempted (`succeeded + failed`)
    pub total: usize,

    /// Sources handed to the run, attempted or not
    pub requested: usize,

    /// Whether cancellation stopped dispatch early
    pub cancelled: bool,

    /// Wall-clock duration of the run in seconds
    pub elapsed_seconds: f64,
}

impl BatchReport {
    /// Create an empty report for `requested` sources.
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// Append a result, updating the counters.
    pub fn push(&mut self, result: TransformResult) {
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.total += 1;
        self.results.push(result);
    }

    pub fn status(&self) -> BatchStatus {
        if self.cancelled {
            BatchStatus::Cancelled
        } else if self.failed > 0 {
            BatchStatus::CompletedWithErrors
        } else {
            BatchStatus::Succeeded
        }
    }

    /// Iterate over the failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &TransformResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, outcome: TransformOutcome) -> TransformResult {
        TransformResult {
            index,
            source: PathBuf::from(format!("/in/{index}.png")),
            outcome,
        }
    }

    #[test]
    fn test_source_format_from_extension_is_case_insensitive() {
        assert_eq!(SourceFormat::from_extension("JPG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension("Tif"), Some(SourceFormat::Tiff));
        assert_eq!(SourceFormat::from_extension("tga"), Some(SourceFormat::Tga));
        assert_eq!(SourceFormat::from_extension("webp"), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_report_counts_and_status() {
        let mut report = BatchReport::new(3);
        report.push(result(
            0,
            TransformOutcome::Success {
                output: PathBuf::from("/out/0.png"),
            },
        ));
        assert_eq!(report.status(), BatchStatus::Succeeded);

        report.push(result(
            1,
            TransformOutcome::DecodeError {
                detail: "bad".to_string(),
            },
        ));
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.requested, 3);
        assert_eq!(report.status(), BatchStatus::CompletedWithErrors);
        assert_eq!(report.failures().count(), 1);

        report.cancelled = true;
        assert_eq!(report.status(), BatchStatus::Cancelled);
    }

    #[test]
    fn test_decode_io_failure_maps_to_io_error() {
        let err = DecodeError::IoFailure {
            path: PathBuf::from("/in/a.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(matches!(
            TransformOutcome::from(err),
            TransformOutcome::IoError { .. }
        ));

        let err = DecodeError::Corrupt {
            path: PathBuf::from("/in/a.png"),
            message: "truncated".to_string(),
        };
        match TransformOutcome::from(err) {
            TransformOutcome::DecodeError { detail } => assert!(detail.contains("truncated")),
            other => panic!("Expected DecodeError, got {other:?}"),
        }
    }

    #[test]
    fn test_transform_result_serializes_flat() {
        let r = result(
            2,
            TransformOutcome::EncodeError {
                detail: "disk full".to_string(),
            },
        );
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"status\":\"encode_error\""));
        assert!(json.contains("\"index\":2"));

        let parsed: TransformResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }
}
