#![no_main]

use libfuzzer_sys::fuzz_target;
use slate_core::{Limits, Reconciler, Store};

fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) {
        let mut store = Store::new();
        let _ = Reconciler::new(&mut store, Limits::default()).apply_status_snapshot(payload);
    }
});
