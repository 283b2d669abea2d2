//! File discovery for finding convertible images.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::DiscoveryError;
use crate::types::{ImageSource, SourceFormat};

/// Discovers image files in a folder, or validates a single file.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Find the images at `input`, classifying it by what is on disk.
    ///
    /// A file is returned alone if its extension is supported. A folder is
    /// listed non-recursively and its matches are sorted by file name.
    pub fn scan(&self, input: &Path) -> Result<Vec<ImageSource>, DiscoveryError> {
        if input.is_dir() {
            self.scan_folder(input)
        } else {
            self.scan_file(input)
        }
    }

    /// Accept `input` as a single image file.
    ///
    /// A directory is rejected as [`DiscoveryError::UnsupportedExtension`].
    pub fn scan_file(&self, input: &Path) -> Result<Vec<ImageSource>, DiscoveryError> {
        let input = absolute(input);

        if input.is_dir() {
            return Err(DiscoveryError::UnsupportedExtension(input));
        }
        if !input.is_file() {
            return Err(DiscoveryError::PathNotFound(input));
        }
        match self.source_for(&input) {
            Some(source) => Ok(vec![source]),
            None => Err(DiscoveryError::UnsupportedExtension(input)),
        }
    }

    /// List the supported images directly inside the folder `input`.
    pub fn scan_folder(&self, input: &Path) -> Result<Vec<ImageSource>, DiscoveryError> {
        let input = absolute(input);

        if !input.is_dir() {
            return Err(DiscoveryError::PathNotFound(input));
        }

        let mut sources: Vec<ImageSource> = WalkDir::new(&input)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", input, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.source_for(entry.path()))
            .collect();

        if sources.is_empty() {
            return Err(DiscoveryError::NoImagesFound(input));
        }

        // Sort by file name for reproducible batch order
        sources.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        tracing::debug!("Discovered {} image(s) in {:?}", sources.len(), input);
        Ok(sources)
    }

    /// Build an [`ImageSource`] if the path has a supported extension.
    fn source_for(&self, path: &Path) -> Option<ImageSource> {
        if !self.is_supported(path) {
            return None;
        }
        SourceFormat::from_path(path).map(|format| ImageSource {
            path: path.to_path_buf(),
            format,
        })
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
