//! Snapshot reconciliation: merging poll payloads into the store.
//!
//! The [`Reconciler`] borrows the store for one `apply` call and merges one
//! decoded snapshot payload, then runs the ordering pass so readers never
//! observe merged-but-unordered state. Applying the same snapshot twice is
//! observably a no-op, and a snapshot that omits a child never deletes it:
//! the feeds send whatever happens to be fresh, not diffs.
//!
//! # Record skipping
//!
//! The envelope decodes strictly (a snapshot without its entity array is
//! rejected whole), but records decode one by one: a record that fails to
//! decode, or carries id 0, is skipped with a warning and the rest of the
//! batch still merges. Duplicate ids within one batch resolve
//! last-write-wins by simple merge order.
//!
//! # Identity
//!
//! A record id, once seen, always denotes the same stored record. Pull
//! request and branch ids resolve across every repository, so a re-sight
//! under a different parent updates the record where it already lives
//! instead of creating a second one. Children are append-only under their
//! parent: jobs keep the group position they first arrived at, and
//! branches and badges keep their slot. Pull requests leave only through
//! the closed list.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Limits;
use crate::error::SnapshotError;
use crate::model::{Badge, Branch, Event, JobGroup, PullRequest, Repository};
use crate::order;
use crate::store::Store;

// ---------------------------------------------------------------------------
// ApplyStats
// ---------------------------------------------------------------------------

/// What one `apply` call did to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Records merged (inserted or updated in place).
    pub merged: usize,
    /// Records skipped as undecodable or carrying an invalid id.
    pub skipped: usize,
    /// Pull requests removed via the closed list.
    pub removed: usize,
    /// Events evicted by truncation.
    pub evicted: usize,
    /// Whether the ordering pass ran. `false` means the view is untouched
    /// and a renderer can skip redrawing.
    pub reordered: bool,
}

impl ApplyStats {
    /// True when the merge changed any record.
    #[must_use]
    pub const fn mutated(&self) -> bool {
        self.merged > 0 || self.removed > 0
    }
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// Event feed envelope. Records stay raw so one bad record skips alone.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    events: Vec<Value>,
}

/// Status feed envelope. `closed` may be absent entirely.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    repo_status: Vec<Value>,
    #[serde(default)]
    closed: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ClosedEntry {
    id: u64,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Merges snapshot payloads into a borrowed [`Store`].
///
/// Construct one per apply; the exclusive borrow is what makes an apply
/// atomic with respect to readers.
pub struct Reconciler<'s> {
    store: &'s mut Store,
    limits: Limits,
}

impl<'s> Reconciler<'s> {
    pub fn new(store: &'s mut Store, limits: Limits) -> Self {
        Self { store, limits }
    }

    /// Merge one event-feed snapshot, then re-order and truncate the event
    /// view.
    ///
    /// An empty snapshot returns immediately without touching the store or
    /// the view. No panic escapes regardless of payload shape.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the payload is not an object or its
    /// `events` array is missing or mistyped; the store is untouched.
    pub fn apply_event_snapshot(&mut self, payload: Value) -> Result<ApplyStats, SnapshotError> {
        if !payload.is_object() {
            return Err(SnapshotError::NotAnObject);
        }
        let envelope: EventEnvelope = serde_json::from_value(payload)?;

        let mut stats = ApplyStats::default();
        if envelope.events.is_empty() {
            debug!("event snapshot is empty, nothing to merge");
            return Ok(stats);
        }

        for (index, raw) in envelope.events.into_iter().enumerate() {
            match serde_json::from_value::<Event>(raw) {
                Ok(event) if event.id == 0 => {
                    warn!(index, "skipping event record with id 0");
                    stats.skipped += 1;
                }
                Ok(event) => {
                    self.merge_event(event);
                    stats.merged += 1;
                }
                Err(error) => {
                    warn!(index, error = %error, "skipping undecodable event record");
                    stats.skipped += 1;
                }
            }
        }

        if stats.mutated() {
            stats.evicted = order::order_events(self.store, self.limits);
            stats.reordered = true;
        }
        Ok(stats)
    }

    /// Merge one status-feed snapshot: repository subtrees first, then the
    /// closed-list removals, then re-order pull requests in every touched
    /// repository.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the payload is not an object or its
    /// `repo_status` array is missing or mistyped; the store is untouched.
    pub fn apply_status_snapshot(&mut self, payload: Value) -> Result<ApplyStats, SnapshotError> {
        if !payload.is_object() {
            return Err(SnapshotError::NotAnObject);
        }
        let envelope: StatusEnvelope = serde_json::from_value(payload)?;

        let mut stats = ApplyStats::default();
        if envelope.repo_status.is_empty() && envelope.closed.is_empty() {
            debug!("status snapshot is empty, nothing to merge");
            return Ok(stats);
        }

        let mut touched: BTreeSet<u64> = BTreeSet::new();

        for (index, raw) in envelope.repo_status.into_iter().enumerate() {
            match serde_json::from_value::<Repository>(raw) {
                Ok(repo) if repo.id == 0 => {
                    warn!(index, "skipping repository record with id 0");
                    stats.skipped += 1;
                }
                Ok(repo) => {
                    touched.insert(repo.id);
                    self.merge_repository(repo, &mut touched);
                    stats.merged += 1;
                }
                Err(error) => {
                    warn!(index, error = %error, "skipping undecodable repository record");
                    stats.skipped += 1;
                }
            }
        }

        for (index, raw) in envelope.closed.into_iter().enumerate() {
            let entry = match serde_json::from_value::<ClosedEntry>(raw) {
                Ok(entry) if entry.id != 0 => entry,
                Ok(_) => {
                    warn!(index, "skipping closed entry with id 0");
                    stats.skipped += 1;
                    continue;
                }
                Err(error) => {
                    warn!(index, error = %error, "skipping undecodable closed entry");
                    stats.skipped += 1;
                    continue;
                }
            };
            let Some(repo_id) = self.store.remove_pull(entry.id) else {
                debug!(id = entry.id, "closed id not in the store, already gone");
                continue;
            };
            touched.insert(repo_id);
            stats.removed += 1;
        }

        if stats.mutated() {
            for repo_id in touched {
                if let Some(repo) = self.store.repository_mut(repo_id) {
                    order::order_pulls(repo);
                }
            }
            stats.reordered = true;
        }
        Ok(stats)
    }

    // -----------------------------------------------------------------------
    // Event merge
    // -----------------------------------------------------------------------

    fn merge_event(&mut self, incoming: Event) {
        let Event {
            id,
            description,
            status,
            sort_key,
            job_groups,
        } = incoming;

        let event = self.store.ensure_event(id);
        event.description = description;
        event.status = status;
        event.sort_key = sort_key;

        for (position, group) in job_groups.into_iter().enumerate() {
            merge_job_group(event, position, group);
        }
    }

    // -----------------------------------------------------------------------
    // Repository merge
    // -----------------------------------------------------------------------

    fn merge_repository(&mut self, incoming: Repository, touched: &mut BTreeSet<u64>) {
        let Repository {
            id,
            name,
            url,
            description,
            branches,
            prs,
            badges,
        } = incoming;

        let created = !self.store.has_repository(id);
        let repo = self.store.ensure_repository(id);
        repo.name = name;
        repo.url = url;
        repo.description = description;
        for badge in badges {
            merge_badge(repo, badge, created);
        }

        for branch in branches {
            self.merge_branch(id, branch);
        }
        for pr in prs {
            self.merge_pull(id, pr, touched);
        }
    }

    /// Pull ids are a global namespace: an id the store already owns, under
    /// whichever repository, updates that record in place. Only a genuinely
    /// new id joins this repository's list.
    fn merge_pull(&mut self, repo_id: u64, incoming: PullRequest, touched: &mut BTreeSet<u64>) {
        if incoming.id == 0 {
            warn!(repo = repo_id, "skipping pull request with id 0");
            return;
        }
        if let Some(owner) = self.store.pull_owner(incoming.id) {
            if owner != repo_id {
                debug!(
                    pull = incoming.id,
                    owner,
                    sighted = repo_id,
                    "pull request re-sighted under a different repository"
                );
            }
            if let Some(pull) = self.store.pull_mut(incoming.id) {
                *pull = incoming;
            }
            touched.insert(owner);
            return;
        }
        self.store.register_pull(incoming.id, repo_id);
        if let Some(repo) = self.store.repository_mut(repo_id) {
            repo.prs.push(incoming);
        }
    }

    /// Known branches take status only; name and url stay as first seen.
    /// The lookup spans every repository, so a branch re-sighted under a
    /// new parent cannot fork into a second record.
    fn merge_branch(&mut self, repo_id: u64, incoming: Branch) {
        if incoming.id == 0 {
            warn!(repo = repo_id, "skipping branch record with id 0");
            return;
        }
        if let Some(branch) = self.store.branch_mut(incoming.id) {
            branch.status = incoming.status;
            return;
        }
        if let Some(repo) = self.store.repository_mut(repo_id) {
            repo.branches.push(incoming);
        }
    }
}

// ---------------------------------------------------------------------------
// Child merge helpers
// ---------------------------------------------------------------------------

/// Merge one positional group of jobs into an event.
///
/// A job already known anywhere under the event updates status and info in
/// its existing slot; a genuinely new job appends to this group in arrival
/// order.
fn merge_job_group(event: &mut Event, position: usize, incoming: JobGroup) {
    for job in incoming.jobs {
        if job.id == 0 {
            warn!(event = event.id, "skipping job record with id 0");
            continue;
        }
        if let Some((group_index, job_index)) = job_position(event, job.id) {
            if let Some(slot) = event
                .job_groups
                .get_mut(group_index)
                .and_then(|group| group.jobs.get_mut(job_index))
            {
                slot.status = job.status;
                slot.info = job.info;
            }
            continue;
        }
        // gap-fill so positions line up even when earlier groups arrived empty
        while event.job_groups.len() <= position {
            event.job_groups.push(JobGroup::default());
        }
        if let Some(group) = event.job_groups.get_mut(position) {
            group.jobs.push(job);
        }
    }
}

/// Locate a job by id anywhere under an event.
fn job_position(event: &Event, job_id: u64) -> Option<(usize, usize)> {
    event
        .job_groups
        .iter()
        .enumerate()
        .find_map(|(group_index, group)| {
            group
                .jobs
                .iter()
                .position(|job| job.id == job_id)
                .map(|job_index| (group_index, job_index))
        })
}

/// Badges are pre-seeded: they join the store only with a brand-new
/// repository. An unseen badge id on an existing repository is dropped.
fn merge_badge(repo: &mut Repository, incoming: Badge, created: bool) {
    if incoming.id == 0 {
        warn!(repo = repo.id, "skipping badge record with id 0");
        return;
    }
    if let Some(badge) = repo.badges.iter_mut().find(|b| b.id == incoming.id) {
        badge.status = incoming.status;
        return;
    }
    if created {
        repo.badges.push(incoming);
    } else {
        warn!(
            repo = repo.id,
            badge = incoming.id,
            "ignoring badge never seeded for this repository"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
