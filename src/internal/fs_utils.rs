//! Filesystem helpers shared by the evaluator and the executor
//!
//! Existence checks, parent directory creation and mtime access.

use crate::core::error::{FetchError, Result};
use filetime::FileTime;
use std::path::Path;
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Ensure a file's parent directory exists.
///
/// Creates the parent directory (and all ancestors) if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| FetchError::io(parent, e))?;
    }
    Ok(())
}

/// Directory a temporary file for `path` should live in, so the final
/// rename never crosses filesystems.
pub fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create the temporary file a fetch into `path` is staged in.
///
/// On unix it is created with mode 0666 so the umask applies exactly as it
/// would to a plain new file, instead of tempfile's private 0600.
pub fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let dir = staging_dir(path);
    let mut builder = tempfile::Builder::new();
    builder.prefix(".fetch-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir).map_err(|e| FetchError::io(dir, e))
}

/// Copy `from`'s permissions onto `to`. A missing `from` is not an error.
pub fn keep_permissions(from: &Path, to: &Path) -> Result<()> {
    match std::fs::metadata(from) {
        Ok(meta) => {
            std::fs::set_permissions(to, meta.permissions()).map_err(|e| FetchError::io(to, e))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FetchError::io(from, e)),
    }
}

/// Last-modified time of a file, `None` if it does not exist.
pub fn modified(path: &Path) -> Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| FetchError::io(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FetchError::io(path, e)),
    }
}

/// Set a file's last-modified time, leaving its access time alone.
pub fn set_modified(path: &Path, time: SystemTime) -> Result<()> {
    filetime::set_file_mtime(path, FileTime::from_system_time(time))
        .map_err(|e| FetchError::io(path, e))
}
