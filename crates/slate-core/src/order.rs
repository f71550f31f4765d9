//! Ordering & truncation pass.
//!
//! Runs after each snapshot merge that changed anything. Events re-sort
//! most-recent-first and the view truncates to the configured limit, with
//! evicted records dropped from the store outright; the limit bounds
//! memory, not just what is shown. Pull requests re-sort by number within
//! each touched repository.
//!
//! # Comparator
//!
//! [`event_order`] is one canonical total order: `sort_key` descending,
//! id ascending on ties. `f64::total_cmp` keeps it total even for
//! non-finite keys, and ids are unique, so no two distinct events ever
//! compare equal. Both sorts are stable, so repeated passes over unchanged
//! data never reshuffle the view.

use std::cmp::Ordering;

use crate::config::Limits;
use crate::model::{Event, PullRequest, Repository};
use crate::store::Store;

// ---------------------------------------------------------------------------
// Comparators
// ---------------------------------------------------------------------------

/// Display order for events: larger `sort_key` first, id ascending on ties.
#[must_use]
pub fn event_order(a: &Event, b: &Event) -> Ordering {
    b.sort_key
        .total_cmp(&a.sort_key)
        .then_with(|| a.id.cmp(&b.id))
}

/// Display order for pull requests: number ascending, id ascending on ties.
#[must_use]
pub fn pull_order(a: &PullRequest, b: &PullRequest) -> Ordering {
    a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id))
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// Re-sort the event view and evict everything ranked beyond
/// `limits.event_limit`. Returns the number of events evicted.
pub(crate) fn order_events(store: &mut Store, limits: Limits) -> usize {
    let (events, view) = store.view_parts();
    view.sort_by(|a, b| match (events.get(a), events.get(b)) {
        (Some(a), Some(b)) => event_order(a, b),
        // ids without a record sort last so truncation reaps them first
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });

    if view.len() <= limits.event_limit {
        return 0;
    }
    let evicted = view.split_off(limits.event_limit);
    for id in &evicted {
        tracing::debug!(id = *id, "evicting event beyond the retention limit");
        store.drop_event(*id);
    }
    evicted.len()
}

/// Re-sort one repository's pull requests by number.
pub(crate) fn order_pulls(repo: &mut Repository) {
    repo.prs.sort_by(pull_order);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
