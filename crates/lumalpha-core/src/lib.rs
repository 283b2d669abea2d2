//! lumalpha core - embeddable luminance-to-alpha batch converter.
//!
//! Takes images in common raster formats, rewrites their alpha channel from
//! per-pixel luminance and writes the result as PNG. A preview path renders
//! the same transform for display without touching the disk.
//!
//! # Architecture
//!
//! ```text
//! Discover → Decode (RGBA8) → Luminance→Alpha → Encode PNG → <stem>.png
//!                                   └──────────→ Preview compositor
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumalpha_core::{CancelToken, Config, Converter, InputSpec, NoProgress, ProcessingRequest};
//!
//! #[tokio::main]
//! async fn main() -> lumalpha_core::Result<()> {
//!     let converter = Converter::new(Config::load()?);
//!     let request = ProcessingRequest {
//!         input: InputSpec::Folder("./scans".into()),
//!         output_folder: "./out".into(),
//!         function: Default::default(),
//!     };
//!     let report = converter.convert(&request, &CancelToken::new(), &NoProgress).await?;
//!     println!("{} converted, {} failed", report.succeeded, report.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, DecodeError, DiscoveryError, EncodeError, LumalphaError, PreconditionError,
    Result,
};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    BatchRunner, CancelToken, DisplayBuffer, FileDiscovery, ImageProcessor, NoProgress,
    PixelBuffer, PngEncoder, PreviewCompositor, PreviewPair, ProgressObserver,
};
pub use types::{
    BatchReport, BatchStatus, DisplayMode, ImageSource, InputSpec, ProcessFunction,
    ProcessingRequest, Progress, SourceFormat, TransformOutcome, TransformResult,
};

use std::path::Path;
use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Converter - the main entry point for batch conversion and previews.
pub struct Converter {
    config: Config,
    discovery: FileDiscovery,
    processor: Arc<ImageProcessor>,
    runner: BatchRunner,
}

impl Converter {
    /// Create a new converter with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing lumalpha v{}", VERSION);
        let processor = Arc::new(ImageProcessor::new(&config));
        Self {
            discovery: FileDiscovery::new(config.processing.clone()),
            runner: BatchRunner::new(Arc::clone(&processor), config.processing.parallel_workers),
            processor,
            config,
        }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover the images a request would process.
    ///
    /// The variant is binding: a `SingleFile` that is a directory, or a
    /// `Folder` that is not, fails instead of being reinterpreted.
    pub fn scan(&self, input: &InputSpec) -> std::result::Result<Vec<ImageSource>, DiscoveryError> {
        match input {
            InputSpec::SingleFile(path) => self.discovery.scan_file(path),
            InputSpec::Folder(path) => self.discovery.scan_folder(path),
        }
    }

    /// Run a full request: discovery, then the batch.
    ///
    /// `Err` means the run could not start (discovery or output folder);
    /// per-file failures are inside the returned report.
    pub async fn convert(
        &self,
        request: &ProcessingRequest,
        cancel: &CancelToken,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchReport> {
        let sources = self.scan(&request.input)?;
        tracing::info!("Found {} image(s) to process", sources.len());
        let report = self
            .runner
            .run(sources, &request.output_folder, request.function, cancel, observer)
            .await?;
        Ok(report)
    }

    /// Render before/after preview panes for `input`.
    ///
    /// A folder previews its first image in batch order.
    pub fn preview(
        &self,
        input: &Path,
        mode: DisplayMode,
        function: ProcessFunction,
    ) -> Result<PreviewPair> {
        let sources = self.discovery.scan(input)?;
        let first = sources
            .first()
            .ok_or_else(|| DiscoveryError::NoImagesFound(input.to_path_buf()))?;
        tracing::debug!("Previewing {:?} as {:?}", first.path, mode);
        Ok(self.processor.preview(&first.path, mode, function)?)
    }
}
