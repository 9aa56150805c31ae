//! Up-to-date decisions for one candidate and destination.
//!
//! The decision is recomputed on every run. The destination's mtime is the
//! only state carried between runs.

use crate::core::error::{FetchError, Result};
use crate::core::options::{FetchPolicy, TaskOptions};
use crate::core::source::Location;
use crate::internal::fs_utils;
use crate::transport::{Probe, Transport};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Why a fetch was or was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    DestinationMissing,
    OverwriteForced,
    RemoteNewer,
    RemoteNotNewer,
    OfflineSkip,
    /// Destination exists and neither `overwrite` nor `only_if_newer` is set.
    AlreadyPresent,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DestinationMissing => "destination missing",
            Self::OverwriteForced => "overwrite forced",
            Self::RemoteNewer => "source is newer",
            Self::RemoteNotNewer => "source is not newer",
            Self::OfflineSkip => "offline",
            Self::AlreadyPresent => "already present",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpToDateDecision {
    pub fetch: bool,
    pub reason: Reason,
}

impl UpToDateDecision {
    fn fetch(reason: Reason) -> Self {
        Self {
            fetch: true,
            reason,
        }
    }

    fn skip(reason: Reason) -> Self {
        Self {
            fetch: false,
            reason,
        }
    }
}

/// Decide whether `candidate` must be fetched into `destination`.
///
/// Only the `IfNewer` policy touches the transport, and only for a
/// metadata probe. Offline with no destination is an error, not a decision.
pub fn should_fetch(
    transport: &dyn Transport,
    candidate: &Location,
    destination: &Path,
    options: &TaskOptions,
) -> Result<UpToDateDecision> {
    let local_modified = fs_utils::modified(destination)?;
    let policy = options.policy();

    let Some(local_modified) = local_modified else {
        if policy == FetchPolicy::Offline {
            return Err(FetchError::OfflineUnavailable(destination.to_path_buf()));
        }
        return Ok(UpToDateDecision::fetch(Reason::DestinationMissing));
    };

    let decision = match policy {
        FetchPolicy::Offline => UpToDateDecision::skip(Reason::OfflineSkip),
        FetchPolicy::Always => UpToDateDecision::fetch(Reason::OverwriteForced),
        FetchPolicy::IfMissing => UpToDateDecision::skip(Reason::AlreadyPresent),
        FetchPolicy::IfNewer => match transport.probe(candidate, Some(local_modified))? {
            Probe::NotModified => UpToDateDecision::skip(Reason::RemoteNotNewer),
            Probe::Modified(Some(remote)) if remote > local_modified => {
                UpToDateDecision::fetch(Reason::RemoteNewer)
            }
            Probe::Modified(Some(_)) => UpToDateDecision::skip(Reason::RemoteNotNewer),
            // No timestamp, nothing proves the local copy is current
            Probe::Modified(None) => UpToDateDecision::fetch(Reason::RemoteNewer),
        },
    };
    Ok(decision)
}
