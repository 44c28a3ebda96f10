// In-memory cache store.
// Associative store keyed by string, holding a JSON value plus an absolute
// expiry instant. Private to the read-through layer in `response`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A single cached value with its expiry instant.
///
/// Entries are always replaced whole on refresh; `expires_at` is set at
/// write time and never revised in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached value, stored as serialized JSON.
    pub value: Value,
    /// Absolute instant after which the entry is stale.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Check if this entry has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Mapping from opaque string key to at most one entry.
///
/// Keys are caller-constructed and must be collision-free for distinct
/// logical resources; the store does not validate this. There is no
/// eviction and no bound on growth: expected key cardinality is one key
/// per distinct upstream query shape.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by key. No side effects.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Store a value under `key`, overwriting any existing entry.
    pub fn set(&mut self, key: impl Into<String>, value: Value, expires_at: DateTime<Utc>) {
        self.entries.insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Remove all entries. Used when upstream configuration changes
    /// invalidate every previously cached response.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries currently held. Observability only.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate size of the cached values in bytes, measured as the
    /// length of their JSON text. Observability only, never used for
    /// eviction (there is no eviction).
    pub fn approximate_byte_size(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, entry)| key.len() + entry.value.to_string().len())
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(key)
    }
}
