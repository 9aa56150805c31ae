//! One transfer from one candidate into one destination file.
//!
//! Content lands in a temporary file next to the destination and is renamed
//! into place only after the whole body was written. A failed transfer
//! leaves the destination exactly as it was. A replaced destination keeps
//! its permissions; a new one gets the usual umask-derived mode.

use crate::core::error::{FetchError, Result};
use crate::core::options::TaskOptions;
use crate::core::output;
use crate::core::source::Location;
use crate::internal::fs_utils;
use crate::internal::progress::{self, ProgressGuard};
use crate::transport::Transport;
use std::io::{Read, Write};
use std::path::Path;
use std::time::SystemTime;

const BUFFER_SIZE: usize = 8192;

/// What a successful transfer produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub bytes: u64,
    /// Timestamp copied from the source, if it exposed one.
    pub last_modified: Option<SystemTime>,
}

/// Fetch `candidate` into `destination`.
///
/// Every failure is returned as-is; retrying is the caller's call.
pub fn fetch(
    transport: &dyn Transport,
    candidate: &Location,
    destination: &Path,
    options: &TaskOptions,
) -> Result<FetchResult> {
    let mut download = transport.open(candidate)?;

    // Only a reachable source may create directories
    fs_utils::ensure_parent_dir(destination)?;
    let mut temp = fs_utils::staging_file(destination)?;

    let pb = progress::download_spinner(
        &format!("downloading {}", candidate.file_name()),
        options.quiet,
    );
    let _guard = ProgressGuard::new(&pb);
    if let Some(len) = download.content_length {
        progress::upgrade_to_bytes(&pb, len);
    }

    let mut buffer = [0u8; BUFFER_SIZE];
    let mut bytes = 0u64;
    loop {
        let read = download.reader.read(&mut buffer).map_err(|e| FetchError::Transport {
            location: candidate.to_string(),
            message: format!("read error: {}", e),
        })?;
        if read == 0 {
            break;
        }
        temp.write_all(&buffer[..read])
            .map_err(|e| FetchError::io(temp.path(), e))?;
        bytes += read as u64;
        pb.set_position(bytes);
    }

    if let Some(expected) = download.content_length
        && bytes != expected
    {
        return Err(FetchError::Transport {
            location: candidate.to_string(),
            message: format!("truncated body: got {} of {} bytes", bytes, expected),
        });
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| FetchError::io(temp.path(), e))?;

    // An overwritten destination keeps its mode
    fs_utils::keep_permissions(destination, temp.path())?;

    // Stamp before the rename so the file never shows up with a wrong mtime
    if let Some(modified) = download.last_modified {
        fs_utils::set_modified(temp.path(), modified)?;
    }

    temp.persist(destination)
        .map_err(|e| FetchError::io(destination, e.error))?;

    if !options.quiet {
        output::detail(&format!(
            "fetched {} ({} bytes)",
            destination.display(),
            bytes
        ));
    }

    Ok(FetchResult {
        bytes,
        last_modified: download.last_modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Download, FileTransport, Probe};
    use filetime::FileTime;
    use std::io::Cursor;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Yields some bytes, then fails mid-stream.
    struct BrokenReader {
        sent: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.sent {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset",
                ));
            }
            self.sent = true;
            let chunk = b"partial";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    enum Body {
        Broken,
        Short,
    }

    struct FailingTransport(Body);

    impl Transport for FailingTransport {
        fn supports(&self, _location: &Location) -> bool {
            true
        }

        fn open(&self, _location: &Location) -> Result<Download> {
            let (reader, content_length): (Box<dyn Read + Send>, _) = match self.0 {
                Body::Broken => (Box::new(BrokenReader { sent: false }), None),
                Body::Short => (Box::new(Cursor::new(b"abc".to_vec())), Some(10)),
            };
            Ok(Download {
                reader,
                content_length,
                last_modified: None,
            })
        }

        fn probe(&self, _location: &Location, _since: Option<SystemTime>) -> Result<Probe> {
            Ok(Probe::Modified(None))
        }
    }

    fn quiet() -> TaskOptions {
        TaskOptions::default().quiet(true)
    }

    fn dir_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_copies_bytes_and_mtime() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src.bin");
        std::fs::write(&src, b"hello world").unwrap();
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_400_000_000);
        filetime::set_file_mtime(&src, FileTime::from_system_time(when)).unwrap();

        let dest = temp.path().join("out/nested/dest.bin");
        let result = fetch(&FileTransport, &Location::Local(src), &dest, &quiet()).unwrap();

        assert_eq!(result.bytes, 11);
        assert_eq!(result.last_modified, Some(when));
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
        assert_eq!(fs_utils::modified(&dest).unwrap(), Some(when));
    }

    #[test]
    fn test_broken_stream_leaves_no_file() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("dest.bin");
        let candidate: Location = "https://example.com/dest.bin".parse().unwrap();

        let err = fetch(&FailingTransport(Body::Broken), &candidate, &dest, &quiet()).unwrap_err();

        assert!(err.is_retryable());
        assert!(!dest.exists());
        assert_eq!(dir_entries(temp.path()), 0, "temporary file must be removed");
    }

    #[test]
    fn test_short_body_keeps_previous_destination() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("dest.bin");
        std::fs::write(&dest, "previous").unwrap();
        let candidate: Location = "https://example.com/dest.bin".parse().unwrap();

        let err = fetch(&FailingTransport(Body::Short), &candidate, &dest, &quiet()).unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "previous");
        assert_eq!(dir_entries(temp.path()), 1);
    }

    #[test]
    fn test_missing_source_does_not_create_destination() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("downloads/dest.bin");

        let result = fetch(
            &FileTransport,
            &Location::Local(temp.path().join("missing")),
            &dest,
            &quiet(),
        );

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!temp.path().join("downloads").exists());
    }

    #[cfg(unix)]
    mod permissions {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn mode(path: &Path) -> u32 {
            std::fs::metadata(path).unwrap().permissions().mode() & 0o777
        }

        fn source(dir: &Path) -> Location {
            let src = dir.join("src.bin");
            std::fs::write(&src, "payload").unwrap();
            std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o644)).unwrap();
            Location::Local(src)
        }

        #[test]
        fn test_overwrite_keeps_destination_mode() {
            let temp = tempdir().unwrap();
            let dest = temp.path().join("tool");
            std::fs::write(&dest, "old").unwrap();
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).unwrap();

            fetch(&FileTransport, &source(temp.path()), &dest, &quiet()).unwrap();

            assert_eq!(std::fs::read_to_string(&dest).unwrap(), "payload");
            assert_eq!(mode(&dest), 0o755);
        }

        #[test]
        fn test_new_destination_gets_umask_mode() {
            let temp = tempdir().unwrap();
            let plain = temp.path().join("plain");
            std::fs::write(&plain, "x").unwrap();
            let dest = temp.path().join("fresh");

            fetch(&FileTransport, &source(temp.path()), &dest, &quiet()).unwrap();

            assert_eq!(mode(&dest), mode(&plain));
        }
    }
}
