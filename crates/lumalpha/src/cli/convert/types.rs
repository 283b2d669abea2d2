//! CLI enum types shared by `convert` and `preview`.

use clap::ValueEnum;
use lumalpha_core::pipeline::AlphaPolarity;
use lumalpha_core::{DisplayMode, OutputFormat, ProcessFunction};

/// Processing function applied to each image.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum Function {
    /// Recompute alpha from luminance (default)
    #[default]
    LumaToAlpha,
    /// Re-encode as PNG without touching the pixels
    ConvertToPng,
}

impl From<Function> for ProcessFunction {
    fn from(function: Function) -> Self {
        match function {
            Function::LumaToAlpha => ProcessFunction::LumaToAlpha,
            Function::ConvertToPng => ProcessFunction::ConvertToPng,
        }
    }
}

/// Which end of the luminance range becomes opaque.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Polarity {
    /// White is opaque, black is transparent
    BrightOpaque,
    /// Black is opaque; luminance above --threshold fades out
    BrightTransparent,
}

impl From<Polarity> for AlphaPolarity {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::BrightOpaque => AlphaPolarity::BrightOpaque,
            Polarity::BrightTransparent => AlphaPolarity::BrightTransparent,
        }
    }
}

/// Machine-readable report formats.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    /// Single JSON object
    Json,
    /// One JSON object per file, then a summary line
    Jsonl,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// How the "after" preview pane is presented.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum Mode {
    /// RGBA as-is
    Normal,
    /// Alpha channel as grayscale
    AlphaOnly,
    /// Composited over a checkerboard (default)
    #[default]
    Checkerboard,
}

impl From<Mode> for DisplayMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Normal => DisplayMode::Normal,
            Mode::AlphaOnly => DisplayMode::AlphaOnly,
            Mode::Checkerboard => DisplayMode::Checkerboard,
        }
    }
}
