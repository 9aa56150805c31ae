//! Outcome classification for the runner that scheduled the fetch.

use crate::core::error::FetchError;
use crate::core::freshness::Reason;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Externally observable state of a whole fetch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// At least one file was transferred.
    Executed,
    /// Nothing needed fetching (includes offline skips).
    UpToDate,
    /// An item ran out of candidates, or offline mode had nothing cached.
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Executed => "EXECUTED",
            Self::UpToDate => "UP-TO-DATE",
            Self::Failed => "FAILED",
        })
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Success { bytes: u64 },
    TransientFailure { error: String },
    Skip { reason: Reason },
}

/// One candidate try, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchAttempt {
    pub location: String,
    pub destination: PathBuf,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// Result of fetching one item through its mirror list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub destination: PathBuf,
    pub executed: bool,
    pub reason: Reason,
    pub attempts: Vec<FetchAttempt>,
}

impl ItemReport {
    /// Location that finally produced (or satisfied) the destination.
    pub fn source(&self) -> Option<&str> {
        self.attempts.last().map(|a| a.location.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub state: TaskState,
    pub items: Vec<ItemReport>,
    /// Terminal error message when `state` is `Failed`.
    pub error: Option<String>,
}

impl TaskReport {
    /// Classify finished items plus an optional terminal failure.
    pub fn classify(items: Vec<ItemReport>, failure: Option<&FetchError>) -> Self {
        let state = match failure {
            Some(_) => TaskState::Failed,
            None if items.iter().any(|item| item.executed) => TaskState::Executed,
            None => TaskState::UpToDate,
        };

        Self {
            state,
            items,
            error: failure.map(ToString::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state != TaskState::Failed
    }

    /// Process exit status for the runner.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
