use std::cmp::Ordering;
use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{Value, json};
use slate_core::{Limits, Reconciler, Store, order};

use generators::*;

fn apply_events(store: &mut Store, limits: Limits, payload: Value) {
    Reconciler::new(store, limits)
        .apply_event_snapshot(payload)
        .expect("generated event snapshot should apply");
}

fn apply_status(store: &mut Store, payload: Value) {
    Reconciler::new(store, Limits::default())
        .apply_status_snapshot(payload)
        .expect("generated status snapshot should apply");
}

proptest! {
    // Configure 1,000 cases for local dev (CI should override this via env vars or config)
    #![proptest_config(proptest::test_runner::Config::with_cases(1000))]

    #[test]
    fn event_applies_are_idempotent(snapshot in arb_event_snapshot(), limits in arb_limits()) {
        let mut store = Store::new();
        apply_events(&mut store, limits, snapshot.clone());
        let once = store.clone();
        apply_events(&mut store, limits, snapshot);
        prop_assert_eq!(store, once);
    }

    #[test]
    fn status_applies_are_idempotent(snapshot in arb_status_snapshot()) {
        let mut store = Store::new();
        apply_status(&mut store, snapshot.clone());
        let once = store.clone();
        apply_status(&mut store, snapshot);
        prop_assert_eq!(store, once);
    }

    #[test]
    fn the_event_view_respects_the_limit(
        snapshots in prop::collection::vec(arb_event_snapshot(), 1..5),
        limits in arb_limits(),
    ) {
        let mut store = Store::new();
        for snapshot in snapshots {
            apply_events(&mut store, limits, snapshot);
        }
        prop_assert!(store.event_count() <= limits.event_limit);
        prop_assert_eq!(store.ordered_events().count(), store.event_count());
    }

    #[test]
    fn ordered_events_follow_the_canonical_order(
        snapshots in prop::collection::vec(arb_event_snapshot(), 1..5),
        limits in arb_limits(),
    ) {
        let mut store = Store::new();
        for snapshot in snapshots {
            apply_events(&mut store, limits, snapshot);
        }
        let events: Vec<_> = store.ordered_events().collect();
        for pair in events.windows(2) {
            prop_assert_eq!(order::event_order(pair[0], pair[1]), Ordering::Less);
        }
    }

    #[test]
    fn malformed_records_never_break_an_apply(
        snapshot in arb_dirty_event_snapshot(),
        limits in arb_limits(),
    ) {
        let mut store = Store::new();
        let stats = Reconciler::new(&mut store, limits)
            .apply_event_snapshot(snapshot)
            .expect("dirty snapshots still apply record by record");
        prop_assert!(store.event_count() <= limits.event_limit);
        prop_assert!(stats.merged >= store.event_count());
    }

    #[test]
    fn pull_lists_stay_sorted_by_number(
        snapshots in prop::collection::vec(arb_status_snapshot(), 1..4),
    ) {
        let mut store = Store::new();
        for snapshot in snapshots {
            apply_status(&mut store, snapshot);
        }
        for repo in store.ordered_repositories() {
            for pair in repo.prs.windows(2) {
                prop_assert_eq!(order::pull_order(&pair[0], &pair[1]), Ordering::Less);
            }
        }
    }

    #[test]
    fn pull_ids_stay_unique_across_repositories(
        snapshots in prop::collection::vec(arb_status_snapshot(), 1..4),
    ) {
        let mut store = Store::new();
        for snapshot in snapshots {
            apply_status(&mut store, snapshot);
        }
        let mut seen = HashSet::new();
        for repo in store.ordered_repositories() {
            for pr in &repo.prs {
                prop_assert!(seen.insert(pr.id), "pull {} held by more than one repository", pr.id);
                prop_assert_eq!(store.pull(pr.id), Some(pr));
            }
        }
    }

    #[test]
    fn closing_every_pull_empties_every_repository(snapshot in arb_status_snapshot()) {
        let mut store = Store::new();
        apply_status(&mut store, snapshot);

        let repo_ids: Vec<u64> = store.ordered_repositories().iter().map(|r| r.id).collect();
        let pull_ids: Vec<u64> = store
            .ordered_repositories()
            .iter()
            .flat_map(|r| r.prs.iter().map(|pr| pr.id))
            .collect();
        let closed: Vec<Value> = pull_ids.iter().map(|id| json!({"id": id})).collect();
        apply_status(&mut store, json!({"repo_status": [], "closed": closed}));

        for id in pull_ids {
            prop_assert!(store.pull(id).is_none());
            prop_assert!(store.entity(id).is_none());
        }
        for repo_id in repo_ids {
            prop_assert_eq!(store.ordered_pulls(repo_id), Some(&[][..]));
        }
    }
}
