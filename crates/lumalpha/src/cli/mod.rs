//! Command implementations.

pub mod config;
pub mod convert;
pub mod preview;

use std::path::{Path, PathBuf};

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
