//! Explicitly invalidatable cache of current-owner results.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cached outcome of one live ownership resolution, keyed by the fingerprint
/// wire prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub owner: String,
    pub tx_ref: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// Read-through cache of "current owner" results.
///
/// No TTL: ledger state changes are rare relative to lookups, so staleness is
/// caller-driven. A caller that just initiated a transfer invalidates or
/// bypasses; concurrent `put`s for one key are last-writer-wins, both having
/// come from a live query moments earlier.
#[derive(Debug, Default)]
pub struct OwnershipCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl OwnershipCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the cached entry, unless the caller forces a bypass.
    pub fn get(&self, fingerprint20: &str, bypass: bool) -> Option<CacheEntry> {
        if bypass {
            return None;
        }
        self.entries.read().get(fingerprint20).cloned()
    }

    pub fn put(&self, fingerprint20: &str, entry: CacheEntry) {
        self.entries
            .write()
            .insert(fingerprint20.to_string(), entry);
    }

    pub fn invalidate(&self, fingerprint20: &str) {
        self.entries.write().remove(fingerprint20);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
