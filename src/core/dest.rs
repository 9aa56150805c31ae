//! Destination handling: a single file or a directory of fetched files.

use crate::core::error::{FetchError, Result};
use crate::core::source::Location;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationSpec {
    /// Write to exactly this path.
    File(PathBuf),
    /// Write each source into this directory, named after its last path segment.
    Directory(PathBuf),
}

impl DestinationSpec {
    /// Infer the kind of destination from a bare path.
    ///
    /// A path is a directory if it already is one, if it ends with a
    /// separator, or if several items are fetched and it is not an existing
    /// file. Everything else is a file.
    pub fn infer(path: impl Into<PathBuf>, items: usize) -> Self {
        let path = path.into();
        let trailing_separator = path
            .as_os_str()
            .to_string_lossy()
            .ends_with(std::path::is_separator);

        if path.is_dir() || trailing_separator || (items > 1 && !path.is_file()) {
            Self::Directory(path)
        } else {
            Self::File(path)
        }
    }

    /// Check the destination can hold `items` files.
    pub fn validate(&self, items: usize) -> Result<()> {
        match self {
            Self::File(path) if items > 1 => Err(FetchError::config(format!(
                "{} sources need a directory destination, but {} is a file",
                items,
                path.display()
            ))),
            Self::File(path) if path.is_dir() => Err(FetchError::config(format!(
                "destination {} is a directory, not a file",
                path.display()
            ))),
            Self::Directory(path) if path.is_file() => Err(FetchError::config(format!(
                "destination {} is a file, not a directory",
                path.display()
            ))),
            _ => Ok(()),
        }
    }

    /// Concrete file a candidate is written to.
    pub fn file_for(&self, location: &Location) -> PathBuf {
        match self {
            Self::File(path) => path.clone(),
            Self::Directory(dir) => dir.join(location.file_name()),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Directory(path) => path,
        }
    }
}
