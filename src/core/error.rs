//! Fetch error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving, probing or fetching a source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot reach {location}: {message}")]
    Transport { location: String, message: String },

    #[error("{location} answered with HTTP status {code}")]
    Status { location: String, code: u16 },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("offline mode and no cached copy exists at {}", .0.display())]
    OfflineUnavailable(PathBuf),

    #[error("all {tried} candidate source(s) failed, last error: {last}")]
    AllCandidatesFailed {
        tried: usize,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failover controller may move on to the next candidate.
    ///
    /// Transport, status and I/O errors only say something about one mirror.
    /// Configuration errors, offline misses and exhaustion are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Io { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
