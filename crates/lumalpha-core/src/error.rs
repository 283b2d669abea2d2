//! Error types for the lumalpha conversion pipeline.
//!
//! Errors are split by stage. Discovery and precondition errors stop a run
//! before any file is touched; decode and encode errors are per-file and end
//! up inside that file's [`TransformResult`](crate::types::TransformResult).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for lumalpha operations.
#[derive(Error, Debug)]
pub enum LumalphaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No usable input could be found
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The run could not start
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Decoding a single image failed (preview path)
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Encoding a single image failed (preview path)
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while looking for input images.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Nothing exists at the input path
    #[error("Input path not found: {0}")]
    PathNotFound(PathBuf),

    /// A single input file does not carry a supported extension
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),

    /// A folder was scanned but held no supported images
    #[error("No supported images found in {0}")]
    NoImagesFound(PathBuf),
}

/// Errors that abort a batch before any file is processed.
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// The output folder is missing and could not be created
    #[error("Cannot create output folder {path}: {source}")]
    OutputFolderUncreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file decode failures.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Neither the signature nor the extension match a supported decoder
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// The container was recognized but parsing failed
    #[error("Corrupt image {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// The file could not be read
    #[error("Cannot read {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File size or pixel dimensions exceed the configured limits
    #[error("Image too large: {path} ({detail})")]
    TooLarge { path: PathBuf, detail: String },
}

/// Per-file encode failures.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The destination could not be written
    #[error("Cannot write {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PNG encoder rejected the buffer
    #[error("PNG encoding failed for {path}: {message}")]
    Png { path: PathBuf, message: String },
}

/// Convenience type alias for lumalpha results.
pub type Result<T> = std::result::Result<T, LumalphaError>;
