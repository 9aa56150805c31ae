//! TOML task files
//!
//! A task file describes one fetch:
//!
//! ```toml
//! src = ["https://example.com/a.tar.gz", { mirrors = ["https://x.example/b", "https://y.example/b"] }]
//! dest = "build/downloads/"
//! overwrite = false
//! only_if_newer = true
//! timeout_secs = 60
//!
//! [headers]
//! X-Token = "abc"
//! ```
//!
//! Every field is optional in the file. Layers are merged with
//! [`TaskFile::merge`], later layers winning, so command-line values can be
//! laid over a file. Offline mode is not a task property and has no field.

use crate::core::error::{FetchError, Result};
use crate::core::options::{TaskOptions, TransportOptions};
use crate::core::source::{Location, SourceEntry, SourceSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    /// One location, or a list whose entries are locations or mirror groups.
    pub src: Option<SrcToml>,
    /// Mirrors of a single file, primary first. Excludes `src`.
    pub mirrors: Option<Vec<String>>,
    pub dest: Option<PathBuf>,
    pub overwrite: Option<bool>,
    pub only_if_newer: Option<bool>,
    pub quiet: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SrcToml {
    One(String),
    Many(Vec<SrcEntryToml>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SrcEntryToml {
    Location(String),
    Mirrors { mirrors: Vec<String> },
}

impl TaskFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FetchError::io(path, e))?;
        Self::parse(&text)
            .map_err(|e| FetchError::config(format!("invalid task file {}: {}", path.display(), e)))
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FetchError::config(e.to_string()))
    }

    /// Lay `other` over `self`; set fields in `other` win, headers are merged.
    pub fn merge(&mut self, other: TaskFile) {
        // A source given in the later layer replaces both source forms
        if other.src.is_some() || other.mirrors.is_some() {
            self.src = other.src;
            self.mirrors = other.mirrors;
        }
        if other.dest.is_some() {
            self.dest = other.dest;
        }
        if other.overwrite.is_some() {
            self.overwrite = other.overwrite;
        }
        if other.only_if_newer.is_some() {
            self.only_if_newer = other.only_if_newer;
        }
        if other.quiet.is_some() {
            self.quiet = other.quiet;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        match (self.headers.as_mut(), other.headers) {
            (Some(dst), Some(src)) => dst.extend(src),
            (None, Some(src)) => self.headers = Some(src),
            _ => {}
        }
    }

    pub fn source_spec(&self) -> Result<SourceSpec> {
        match (&self.src, &self.mirrors) {
            (Some(_), Some(_)) => Err(FetchError::config(
                "`src` and `mirrors` are mutually exclusive",
            )),
            (None, None) => Err(FetchError::config("no source given (`src` or `mirrors`)")),
            (None, Some(mirrors)) => SourceSpec::parse_mirrors(mirrors),
            (Some(SrcToml::One(raw)), None) => raw.parse::<Location>().map(SourceSpec::Single),
            (Some(SrcToml::Many(entries)), None) => entries
                .iter()
                .map(|entry| match entry {
                    SrcEntryToml::Location(raw) => {
                        raw.parse::<Location>().map(SourceEntry::Location)
                    }
                    SrcEntryToml::Mirrors { mirrors } => mirrors
                        .iter()
                        .map(|raw| raw.parse::<Location>())
                        .collect::<Result<Vec<_>>>()
                        .map(SourceEntry::Mirrors),
                })
                .collect::<Result<Vec<_>>>()
                .map(SourceSpec::List),
        }
    }

    pub fn destination(&self) -> Result<&Path> {
        self.dest
            .as_deref()
            .ok_or_else(|| FetchError::config("no destination given (`dest`)"))
    }

    /// Task options with defaults filled in. `offline` is always false here.
    pub fn options(&self) -> TaskOptions {
        let defaults = TaskOptions::default();

        let mut transport = TransportOptions {
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
            ..TransportOptions::default()
        };
        for (name, value) in self.headers.iter().flatten() {
            transport = transport.header(name, value);
        }

        defaults
            .clone()
            .overwrite(self.overwrite.unwrap_or(defaults.overwrite))
            .only_if_newer(self.only_if_newer.unwrap_or(defaults.only_if_newer))
            .quiet(self.quiet.unwrap_or(defaults.quiet))
            .transport(transport)
    }
}
