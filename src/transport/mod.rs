//! Byte transport abstraction
//!
//! The fetch pipeline never speaks a protocol itself. It asks a
//! [`Transport`] to open a stream or to report a source's last-modified
//! time, and decides everything else on its own.
//!
//! - [`HttpTransport`]: `http://` and `https://` through `ureq`
//! - [`FileTransport`]: local paths and `file://` URLs
//! - [`Transports`]: dispatches to whichever of the two supports a location

pub mod file;
pub mod http;

use crate::core::error::{FetchError, Result};
use crate::core::options::TransportOptions;
use crate::core::source::Location;
use std::io::Read;
use std::time::SystemTime;

pub use file::FileTransport;
pub use http::HttpTransport;

/// An open transfer.
pub struct Download {
    pub reader: Box<dyn Read + Send>,
    /// Total size when the source announces it.
    pub content_length: Option<u64>,
    /// Source timestamp to stamp onto the destination after the transfer.
    pub last_modified: Option<SystemTime>,
}

/// Answer to a metadata-only staleness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The source confirmed it has not changed since the given time.
    NotModified,
    /// The source may have changed; carries its timestamp if it has one.
    Modified(Option<SystemTime>),
}

pub trait Transport {
    /// Whether this transport can handle the location at all.
    fn supports(&self, location: &Location) -> bool;

    /// Start a transfer. Non-success statuses are errors.
    fn open(&self, location: &Location) -> Result<Download>;

    /// Query the source's last-modified time without transferring content.
    ///
    /// `since` is the destination's timestamp; transports that support
    /// conditional requests may answer [`Probe::NotModified`] directly.
    fn probe(&self, location: &Location, since: Option<SystemTime>) -> Result<Probe>;
}

/// Default transport set: HTTP(S) and local files.
pub struct Transports {
    http: HttpTransport,
    file: FileTransport,
}

impl Transports {
    pub fn new(options: &TransportOptions) -> Self {
        Self {
            http: HttpTransport::new(options),
            file: FileTransport,
        }
    }

    fn pick(&self, location: &Location) -> Result<&dyn Transport> {
        let candidates: [&dyn Transport; 2] = [&self.http, &self.file];
        candidates
            .into_iter()
            .find(|t| t.supports(location))
            .ok_or_else(|| FetchError::config(format!("no transport for {}", location)))
    }
}

impl Transport for Transports {
    fn supports(&self, location: &Location) -> bool {
        self.pick(location).is_ok()
    }

    fn open(&self, location: &Location) -> Result<Download> {
        self.pick(location)?.open(location)
    }

    fn probe(&self, location: &Location, since: Option<SystemTime>) -> Result<Probe> {
        self.pick(location)?.probe(location, since)
    }
}
