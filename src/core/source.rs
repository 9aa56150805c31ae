//! Source locations and their resolution into fetch items.
//!
//! A [`SourceSpec`] is what the user configured. [`SourceSpec::resolve`]
//! turns it into [`FetchItem`]s: one per destination file, each carrying its
//! candidates in priority order.

use crate::core::error::{FetchError, Result};
use crate::internal::url_utils;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A single place content can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `http://` or `https://` URL.
    Remote(String),
    /// Local path, given bare or as a `file://` URL.
    Local(PathBuf),
}

impl Location {
    /// Name of the file this location would produce inside a directory.
    pub fn file_name(&self) -> String {
        match self {
            Self::Remote(url) => url_utils::extract_filename(url),
            Self::Local(path) => path
                .file_name()
                .map(|name| url_utils::sanitize_filename(&name.to_string_lossy()))
                .unwrap_or_else(|| "download".to_string()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl FromStr for Location {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FetchError::config("empty source location"));
        }

        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Remote(s.to_string()));
        }
        if lower.starts_with("file://") {
            return file_url_path(s).map(Self::Local);
        }
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(FetchError::config(format!(
                "unsupported scheme '{}' in {}",
                scheme, s
            )));
        }
        Ok(Self::Local(PathBuf::from(s)))
    }
}

/// Path of a `file://` URL. Only an empty or `localhost` host is accepted.
fn file_url_path(url: &str) -> Result<PathBuf> {
    let rest = &url["file://".len()..];
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);
    let (host, path) = match rest.find('/') {
        Some(slash) => rest.split_at(slash),
        None => (rest, ""),
    };

    if !(host.is_empty() || host.eq_ignore_ascii_case("localhost")) {
        return Err(FetchError::config(format!(
            "remote host '{}' not supported in {}",
            host, url
        )));
    }
    if path.is_empty() {
        return Err(FetchError::config(format!("no path in {}", url)));
    }
    Ok(PathBuf::from(url_utils::percent_decode(path)))
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One element of a source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    Location(Location),
    /// Alternate locations for the same file, primary first.
    Mirrors(Vec<Location>),
}

impl From<Location> for SourceEntry {
    fn from(location: Location) -> Self {
        Self::Location(location)
    }
}

/// User-supplied source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// One file from one location.
    Single(Location),
    /// Several files, one per entry.
    List(Vec<SourceEntry>),
    /// One file, tried against each queued mirror in turn.
    Mirrors(VecDeque<Location>),
}

impl SourceSpec {
    /// Parse a list of raw locations: one becomes `Single`, more become `List`.
    pub fn parse_list<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let mut locations = raw
            .iter()
            .map(|s| s.as_ref().parse::<Location>())
            .collect::<Result<Vec<_>>>()?;
        match locations.len() {
            0 => Err(FetchError::config("no source locations given")),
            1 => Ok(Self::Single(locations.remove(0))),
            _ => Ok(Self::List(locations.into_iter().map(Into::into).collect())),
        }
    }

    /// Parse raw locations as mirrors of a single file.
    pub fn parse_mirrors<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        raw.iter()
            .map(|s| s.as_ref().parse::<Location>())
            .collect::<Result<VecDeque<_>>>()
            .map(Self::Mirrors)
    }

    /// Normalize into fetch items, preserving the configured order.
    ///
    /// Fails if the sources, a list entry or a mirror group are empty.
    pub fn resolve(&self) -> Result<Vec<FetchItem>> {
        let items = match self {
            Self::Single(location) => vec![FetchItem::new(vec![location.clone()])?],
            Self::List(entries) => entries
                .iter()
                .map(|entry| match entry {
                    SourceEntry::Location(location) => FetchItem::new(vec![location.clone()]),
                    SourceEntry::Mirrors(mirrors) => FetchItem::new(mirrors.clone()),
                })
                .collect::<Result<Vec<_>>>()?,
            Self::Mirrors(queue) => vec![FetchItem::new(queue.iter().cloned().collect())?],
        };

        if items.is_empty() {
            return Err(FetchError::config("no source locations given"));
        }
        Ok(items)
    }
}

impl From<Location> for SourceSpec {
    fn from(location: Location) -> Self {
        Self::Single(location)
    }
}

/// The ordered candidates for one destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchItem {
    candidates: Vec<Location>,
}

impl FetchItem {
    /// Build an item; an empty candidate list is a configuration error.
    pub fn new(candidates: Vec<Location>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(FetchError::config("mirror list is empty"));
        }
        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[Location] {
        &self.candidates
    }

    /// The highest-priority candidate.
    pub fn primary(&self) -> &Location {
        &self.candidates[0]
    }
}
