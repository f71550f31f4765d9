//! Retention limits.
//!
//! The engine does not own configuration: whoever drives polling decides
//! how many events to retain and hands a [`Limits`] to each reconciler.
//! The TOML loader exists for drivers that want a file; unknown keys in
//! the file are rejected so a typo fails loudly instead of silently
//! falling back to a default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Retention tuning consumed by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    /// Maximum number of events retained after the ordering pass. Events
    /// ranked beyond this are evicted outright.
    #[serde(default = "default_event_limit")]
    pub event_limit: usize,
}

const fn default_event_limit() -> usize {
    30
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            event_limit: default_event_limit(),
        }
    }
}

impl Limits {
    /// Load limits from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as a
    /// limits table (including any unknown key).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read limits from {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse limits from {}", path.display()))
    }
}
