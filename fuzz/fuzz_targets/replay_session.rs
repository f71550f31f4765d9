#![no_main]

use libfuzzer_sys::fuzz_target;
use slate_core::{Limits, Reconciler, Store};

// Feed the same payload through both feeds against one store, with a tight
// limit so the eviction path stays hot. Errors are expected; panics are not.
fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) {
        let limits = Limits { event_limit: 3 };
        let mut store = Store::new();
        let _ = Reconciler::new(&mut store, limits).apply_event_snapshot(payload.clone());
        let _ = Reconciler::new(&mut store, limits).apply_status_snapshot(payload);
    }
});
