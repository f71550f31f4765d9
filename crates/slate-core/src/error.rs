//! Snapshot rejection errors.
//!
//! Only *structural* problems reject a snapshot: the payload is not a JSON
//! object, or its entity array is missing or mistyped. Everything below the
//! envelope (an undecodable record, an unknown status, an id collision) is
//! handled record by record inside the reconciler and never surfaces here.
//! A rejected snapshot is a guaranteed no-op: the store is left exactly as
//! it was.

use thiserror::Error;

/// Why an entire snapshot was rejected without touching the store.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload was not a JSON object at the top level.
    #[error("snapshot is not a JSON object")]
    NotAnObject,

    /// The payload is an object but its envelope does not decode: the
    /// entity array (`events` or `repo_status`) is missing or not an array.
    #[error("snapshot envelope is malformed: {0}")]
    Envelope(#[from] serde_json::Error),
}
