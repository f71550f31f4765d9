//! Status vocabulary shared by every entity kind.
//!
//! Statuses travel as lowercase `snake_case` strings in snapshot payloads
//! (`"running"`, `"failed_ok"`). Decoding is deliberately lenient: a string
//! this build does not recognize becomes [`Status::Unknown`] instead of
//! failing the record, so a newer server never breaks an older dashboard.
//! Older feeds used mixed-case slugs (`"Failed_OK"`, `"Not_Started"`); those
//! normalize to the same variants.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Execution status of an event, job, branch, pull request, or badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Status {
    /// Scheduled but not yet picked up by a runner.
    Queued,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with a failure that gates the run.
    Failed,
    /// Finished with a failure the run is configured to tolerate.
    FailedOk,
    /// Canceled before completion.
    Canceled,
    /// Waiting on a manual approval before it may start.
    ActivationRequired,
    /// Failed in a way known to be flaky.
    Intermittent,
    /// Deliberately not run.
    Skipped,
    /// Status string not recognized by this build.
    #[default]
    Unknown,
}

impl Status {
    /// Wire form of the status, as emitted in snapshots and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::FailedOk => "failed_ok",
            Self::Canceled => "canceled",
            Self::ActivationRequired => "activation_required",
            Self::Intermittent => "intermittent",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the status still expects progress on a future poll.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Resolve a wire string, tolerating unknown values.
    ///
    /// Matching is case-insensitive and accepts the legacy slugs some feeds
    /// still emit (`"Passed"`, `"Not_Started"`, `"Intermittent_Failure"`).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "not_started" => Self::Queued,
            "running" => Self::Running,
            "succeeded" | "passed" => Self::Succeeded,
            "failed" => Self::Failed,
            "failed_ok" => Self::FailedOk,
            "canceled" => Self::Canceled,
            "activation_required" => Self::ActivationRequired,
            "intermittent" | "intermittent_failure" => Self::Intermittent,
            "skipped" => Self::Skipped,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for Status {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
