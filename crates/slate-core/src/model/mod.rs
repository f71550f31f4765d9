//! Entity records held in the [`Store`](crate::store::Store).
//!
//! The same types decode straight off the snapshot wire and are handed back
//! out through the ordered accessors, so there is no separate transfer
//! layer: what the reconciler merges is what the renderer reads. Every
//! record field except `id` is `#[serde(default)]`: a record missing its
//! id cannot be merged and is skipped upstream, while any other gap decodes
//! to an empty value. Unknown fields (feeds attach bookkeeping like
//! `last_request`) are ignored.
//!
//! Ids are server-assigned positive integers. Zero never names a real
//! entity (older feeds used it as a renderer-side marker) and is treated as
//! invalid wherever an id is consumed.

pub mod status;

pub use status::Status;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event subtree
// ---------------------------------------------------------------------------

/// One CI run trigger: a push or pull-request head that spawned jobs.
///
/// Events are the left column of the dashboard, ordered most-recent-first
/// by `sort_key` and bounded by the configured event limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned id, stable across polls.
    pub id: u64,
    /// Human-readable summary line ("push devel", "PR #1021 rev 3").
    #[serde(default)]
    pub description: String,
    /// Aggregate status of the run.
    #[serde(default)]
    pub status: Status,
    /// Recency key, monotonic per the server clock. Larger is newer.
    #[serde(default)]
    pub sort_key: f64,
    /// Dependency stages in execution order. Positions are stable: group 0
    /// stays group 0 across every merge.
    #[serde(default)]
    pub job_groups: Vec<JobGroup>,
}

impl Event {
    /// Empty record for an id about to receive its first merge.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            description: String::new(),
            status: Status::default(),
            sort_key: 0.0,
            job_groups: Vec::new(),
        }
    }

    /// Total number of jobs across all groups.
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.job_groups.iter().map(|group| group.jobs.len()).sum()
    }
}

/// One dependency stage within an event; jobs inside it ran concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobGroup {
    /// Jobs in arrival order. Order within a group is append-only.
    pub jobs: Vec<Job>,
}

/// A single runner invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub status: Status,
    /// Short display text ("Test linux-gnu", "Build docs").
    #[serde(default)]
    pub info: String,
}

// ---------------------------------------------------------------------------
// Repository subtree
// ---------------------------------------------------------------------------

/// A tracked source repository with its branch, pull-request, and badge
/// children. Repositories persist for the whole session; only their
/// children change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Tracked branches. Append-only; re-sightings update status only.
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Open pull requests, kept sorted by number by the ordering pass.
    #[serde(default)]
    pub prs: Vec<PullRequest>,
    /// Status badges. Seeded when the repository is first sighted, never
    /// added to afterwards.
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl Repository {
    /// Empty record for an id about to receive its first merge.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            url: String::new(),
            description: String::new(),
            branches: Vec::new(),
            prs: Vec::new(),
            badges: Vec::new(),
        }
    }
}

/// A tracked branch. Status reflects the latest run on that branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: Status,
}

/// An open pull request under a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    /// Forge-assigned PR number, the display ordering key.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub title: String,
    /// Author login. The wire field is `user`.
    #[serde(default, rename = "user")]
    pub author: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub description: String,
}

/// Status-only marker (nightly health, coverage, and similar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: u64,
    #[serde(default)]
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
