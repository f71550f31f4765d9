//! Core state for a CI dashboard: an id-keyed store of events,
//! repositories, and pull requests, fed by polled JSON snapshots.
//!
//! The crate is organized around one write path and a few read paths:
//!
//! - [`model`] holds the record types as they appear on the wire.
//! - [`store::Store`] owns the records and the ordered event view.
//! - [`reconcile::Reconciler`] merges one snapshot payload per apply,
//!   skipping malformed records and keeping every apply idempotent.
//! - [`order`] defines the canonical comparators the views obey.
//! - [`config::Limits`] bounds how many events the store retains.
//!
//! A poller owns the [`Store`], hands it to a [`Reconciler`] for each
//! fetched snapshot, and renders from the ordered accessors between polls.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod model;
pub mod order;
pub mod reconcile;
pub mod store;

pub use config::Limits;
pub use error::SnapshotError;
pub use model::Status;
pub use reconcile::{ApplyStats, Reconciler};
pub use store::{Entity, Store};
