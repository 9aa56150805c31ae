//! Local file transport.

use super::{Download, Probe, Transport};
use crate::core::error::{FetchError, Result};
use crate::core::source::Location;
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

/// Reads sources from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

fn local_path(location: &Location) -> Result<&Path> {
    match location {
        Location::Local(path) => Ok(path),
        Location::Remote(url) => Err(FetchError::config(format!("{} is not a local path", url))),
    }
}

impl Transport for FileTransport {
    fn supports(&self, location: &Location) -> bool {
        matches!(location, Location::Local(_))
    }

    fn open(&self, location: &Location) -> Result<Download> {
        let path = local_path(location)?;
        let file = File::open(path).map_err(|e| FetchError::io(path, e))?;
        let meta = file.metadata().map_err(|e| FetchError::io(path, e))?;
        if meta.is_dir() {
            return Err(FetchError::io(
                path,
                std::io::Error::other("source is a directory"),
            ));
        }

        Ok(Download {
            reader: Box::new(file),
            content_length: Some(meta.len()),
            last_modified: meta.modified().ok(),
        })
    }

    fn probe(&self, location: &Location, _since: Option<SystemTime>) -> Result<Probe> {
        let path = local_path(location)?;
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| FetchError::io(path, e))?;
        Ok(Probe::Modified(Some(modified)))
    }
}
