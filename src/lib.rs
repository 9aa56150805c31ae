//! Build-time file fetcher for LevitateOS
//!
//! Fetches one or more files from remote URLs or local paths into a
//! destination, but only when the destination is missing or stale, and falls
//! over to alternate mirrors when a source cannot be reached.
//!
//! # Example
//!
//! ```no_run
//! use levitate_fetch::{DownloadTask, SourceSpec, TaskOptions, TaskState};
//!
//! let source = SourceSpec::parse_mirrors(&[
//!     "https://ftp.gnu.org/gnu/bash/bash-5.2.26.tar.gz",
//!     "https://mirrors.kernel.org/gnu/bash/bash-5.2.26.tar.gz",
//! ])?;
//! let options = TaskOptions::default().overwrite(false);
//!
//! let report = DownloadTask::new(source, "downloads/", options).run()?;
//! assert_ne!(report.state, TaskState::Failed);
//! # Ok::<(), levitate_fetch::FetchError>(())
//! ```
//!
//! # Up-to-date rules
//!
//! For a destination that already exists:
//!
//! - offline mode keeps it, whatever the other flags say
//! - `only_if_newer` fetches only when the source timestamp is strictly newer
//! - otherwise `overwrite` (the default) always fetches
//! - with neither flag, presence alone is enough
//!
//! A missing destination is always fetched, except offline, where the task
//! fails.
//!
//! # Mirror failover
//!
//! Each file's candidates are tried in order, once each. Any transport,
//! status or I/O error moves on to the next candidate; the file fails only
//! when every candidate has failed. Content is written to a temporary file
//! and renamed into place, so a failed attempt never leaves a partial
//! destination behind. The source's last-modified time is copied onto the
//! destination, which is all the state kept between runs.
//!
//! # Environment
//!
//! - `FETCH_HTTP_TIMEOUT` - HTTP connect/read timeout in seconds (default 30, clamped 5-300)
//! - `FETCH_OFFLINE` - offline mode for the `fetch` binary

mod core;
mod internal;
pub mod transport;

pub use crate::core::config::{SrcEntryToml, SrcToml, TaskFile};
pub use crate::core::dest::DestinationSpec;
pub use crate::core::error::{FetchError, Result};
pub use crate::core::executor::{FetchResult, fetch};
pub use crate::core::failover::fetch_with_failover;
pub use crate::core::freshness::{Reason, UpToDateDecision, should_fetch};
pub use crate::core::options::{FetchPolicy, TaskOptions, TransportOptions};
pub use crate::core::output;
pub use crate::core::report::{AttemptOutcome, FetchAttempt, ItemReport, TaskReport, TaskState};
pub use crate::core::source::{FetchItem, Location, SourceEntry, SourceSpec};
pub use crate::core::task::DownloadTask;
