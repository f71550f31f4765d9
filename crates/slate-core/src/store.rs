//! The store: authoritative, id-keyed holder of all entity records.
//!
//! One store lives for one dashboard session. The reconciler
//! ([`crate::reconcile`]) is the only writer: every mutating method is
//! crate-private, so outside this crate the store is read-only by
//! construction. Readers get the ordered accessors plus O(1) id lookup;
//! nothing here sorts or merges.
//!
//! # Indexes
//!
//! Events and repositories are top-level maps. Pull requests live inside
//! their owning repository, with a global `pull id → repository id` index
//! alongside: closed-list removal arrives with a bare id and no owner, and
//! a merge must find a known pull wherever it lives. The index is kept in
//! step with every insert and removal.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::model::{Branch, Event, PullRequest, Repository};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// View of whichever record an id resolves to.
///
/// Ids are unique per entity kind, so one numeric id can in principle name
/// an event and a pull request at once; lookup resolves events first, then
/// repositories, then pull requests. The backend allocates each kind from
/// its own sequence, so overlaps do not occur in practice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    Event(&'a Event),
    Repository(&'a Repository),
    PullRequest(&'a PullRequest),
}

impl Entity<'_> {
    /// Id of the underlying record.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Event(event) => event.id,
            Self::Repository(repo) => repo.id,
            Self::PullRequest(pr) => pr.id,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory entity store for one dashboard session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    events: HashMap<u64, Event>,
    /// Event ids in display order. Rewritten by the ordering pass; inserts
    /// append to the tail until then.
    event_view: Vec<u64>,
    repos: HashMap<u64, Repository>,
    /// Global pull-request owner index: pull id → repository id.
    pull_owners: HashMap<u64, u64>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// Look up any addressable record by bare id.
    #[must_use]
    pub fn entity(&self, id: u64) -> Option<Entity<'_>> {
        if let Some(event) = self.events.get(&id) {
            return Some(Entity::Event(event));
        }
        if let Some(repo) = self.repos.get(&id) {
            return Some(Entity::Repository(repo));
        }
        self.pull(id).map(Entity::PullRequest)
    }

    /// Look up an event by id.
    #[must_use]
    pub fn event(&self, id: u64) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Look up a repository by id.
    #[must_use]
    pub fn repository(&self, id: u64) -> Option<&Repository> {
        self.repos.get(&id)
    }

    /// Look up a pull request by bare id, through the owner index.
    #[must_use]
    pub fn pull(&self, id: u64) -> Option<&PullRequest> {
        let repo_id = self.pull_owners.get(&id)?;
        self.repos
            .get(repo_id)?
            .prs
            .iter()
            .find(|pr| pr.id == id)
    }

    /// Owning repository of a pull request id, if the id is known.
    #[must_use]
    pub fn pull_owner(&self, id: u64) -> Option<u64> {
        self.pull_owners.get(&id).copied()
    }

    /// Events in display order: most recent first, bounded by the event
    /// limit as of the last ordering pass.
    pub fn ordered_events(&self) -> impl Iterator<Item = &Event> {
        self.event_view.iter().filter_map(|id| self.events.get(id))
    }

    /// Pull requests of one repository, sorted by number as of the last
    /// ordering pass. `None` if the repository is unknown.
    #[must_use]
    pub fn ordered_pulls(&self, repo_id: u64) -> Option<&[PullRequest]> {
        self.repos.get(&repo_id).map(|repo| repo.prs.as_slice())
    }

    /// All repositories, sorted by name (id breaks ties). Computed per
    /// call; the repository set is small and changes rarely.
    #[must_use]
    pub fn ordered_repositories(&self) -> Vec<&Repository> {
        let mut repos: Vec<&Repository> = self.repos.values().collect();
        repos.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        repos
    }

    /// Number of retained events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of known repositories.
    #[must_use]
    pub fn repository_count(&self) -> usize {
        self.repos.len()
    }

    /// True when no entity of any kind is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.repos.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutation (reconciler-only)
    // -----------------------------------------------------------------------

    /// Get the event for `id`, creating an empty record on first sighting.
    /// New ids append to the tail of the view; the ordering pass places
    /// them properly afterwards.
    pub(crate) fn ensure_event(&mut self, id: u64) -> &mut Event {
        match self.events.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.event_view.push(id);
                entry.insert(Event::new(id))
            }
        }
    }

    /// Get the repository for `id`, creating an empty record on first
    /// sighting.
    pub(crate) fn ensure_repository(&mut self, id: u64) -> &mut Repository {
        self.repos.entry(id).or_insert_with(|| Repository::new(id))
    }

    pub(crate) fn repository_mut(&mut self, id: u64) -> Option<&mut Repository> {
        self.repos.get_mut(&id)
    }

    pub(crate) fn has_repository(&self, id: u64) -> bool {
        self.repos.contains_key(&id)
    }

    /// Record `repo_id` as the owner of pull request `pull_id`.
    pub(crate) fn register_pull(&mut self, pull_id: u64, repo_id: u64) {
        if self.events.contains_key(&pull_id) || self.repos.contains_key(&pull_id) {
            tracing::warn!(
                id = pull_id,
                "pull request id collides with another entity kind"
            );
        }
        self.pull_owners.insert(pull_id, repo_id);
    }

    /// Mutable pull-request lookup through the owner index.
    pub(crate) fn pull_mut(&mut self, id: u64) -> Option<&mut PullRequest> {
        let repo_id = *self.pull_owners.get(&id)?;
        self.repos
            .get_mut(&repo_id)?
            .prs
            .iter_mut()
            .find(|pr| pr.id == id)
    }

    /// Mutable branch lookup, scanning every repository. Branches have no
    /// owner index; nothing removes them by bare id.
    pub(crate) fn branch_mut(&mut self, id: u64) -> Option<&mut Branch> {
        self.repos
            .values_mut()
            .find_map(|repo| repo.branches.iter_mut().find(|b| b.id == id))
    }

    /// Remove a pull request by bare id. Returns the owning repository's id
    /// when something was removed, `None` for an unknown target.
    pub(crate) fn remove_pull(&mut self, pull_id: u64) -> Option<u64> {
        let repo_id = self.pull_owners.remove(&pull_id)?;
        if let Some(repo) = self.repos.get_mut(&repo_id) {
            if let Some(position) = repo.prs.iter().position(|pr| pr.id == pull_id) {
                repo.prs.remove(position);
            }
        }
        Some(repo_id)
    }

    /// Drop an event record evicted by truncation. The caller owns the
    /// view; this only clears the record map.
    pub(crate) fn drop_event(&mut self, id: u64) {
        self.events.remove(&id);
    }

    /// Split borrow for the ordering pass: the record map (read) and the
    /// view (reordered in place).
    pub(crate) fn view_parts(&mut self) -> (&HashMap<u64, Event>, &mut Vec<u64>) {
        (&self.events, &mut self.event_view)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
