//! Image conversion pipeline components.
//!
//! - **buffer**: Canonical RGBA8 pixel buffer
//! - **validate**: Size limits and signature sniffing
//! - **decode**: Load and normalize images from PNG/JPEG/TIFF/TGA/BMP
//! - **transform**: Luminance to alpha mapping
//! - **encode**: Atomic PNG output
//! - **preview**: Display-mode rendering for preview panes
//! - **discovery**: Find image files in a folder
//! - **processor**: Per-file orchestration
//! - **batch**: Ordered, cancellable multi-file runs

pub mod batch;
pub mod buffer;
pub mod decode;
pub mod discovery;
pub mod encode;
pub mod preview;
pub mod processor;
pub mod transform;
pub mod validate;

// Re-exports for convenient access
pub use batch::{BatchRunner, CancelToken, NoProgress, ProgressObserver};
pub use buffer::{DisplayBuffer, PixelBuffer};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use encode::PngEncoder;
pub use preview::{PreviewCompositor, PreviewPair};
pub use processor::ImageProcessor;
pub use transform::{AlphaPolarity, LumaParams, LumaWeights, LuminanceAlphaTransform};
pub use validate::Validator;
