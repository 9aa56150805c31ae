//! Task options and the fetch policy they imply.

use std::time::Duration;

/// Options for one fetch invocation.
///
/// | flag            | default |
/// |-----------------|---------|
/// | `overwrite`     | `true`  |
/// | `only_if_newer` | `false` |
/// | `offline`       | `false` |
/// | `quiet`         | `false` |
///
/// The flags are not independent; [`TaskOptions::policy`] turns them into
/// the one [`FetchPolicy`] the freshness evaluator acts on.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// Replace an existing destination even if it looks current.
    pub overwrite: bool,
    /// Only fetch when the source is strictly newer than the destination.
    pub only_if_newer: bool,
    /// Global runner mode: never touch the network.
    pub offline: bool,
    /// Suppress progress bars and detail lines.
    pub quiet: bool,
    /// Passed through to the transport unchanged.
    pub transport: TransportOptions,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            only_if_newer: false,
            offline: false,
            quiet: false,
            transport: TransportOptions::default(),
        }
    }
}

impl TaskOptions {
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn only_if_newer(mut self, only_if_newer: bool) -> Self {
        self.only_if_newer = only_if_newer;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    /// Resolve the flag combination into a single policy.
    ///
    /// Offline beats everything, `only_if_newer` beats `overwrite`.
    pub fn policy(&self) -> FetchPolicy {
        match (self.offline, self.only_if_newer, self.overwrite) {
            (true, _, _) => FetchPolicy::Offline,
            (false, true, _) => FetchPolicy::IfNewer,
            (false, false, true) => FetchPolicy::Always,
            (false, false, false) => FetchPolicy::IfMissing,
        }
    }
}

/// What to do with a destination that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Keep whatever is there; fail if nothing is.
    Offline,
    /// Compare timestamps with the source.
    IfNewer,
    /// Fetch unconditionally.
    Always,
    /// Presence alone means up to date.
    IfMissing,
}

/// Transport settings passed through to the HTTP client.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Extra request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Basic auth user name.
    pub username: Option<String>,
    /// Basic auth password (empty if only a user name is given).
    pub password: Option<String>,
    /// Connect/read timeout. Falls back to `FETCH_HTTP_TIMEOUT`.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl TransportOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
