// Read-through response cache.
// Wraps the cache store; a miss transparently invokes the producer and
// populates the store as a side effect of the read.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::Result;

use super::store::CacheStore;

/// Default TTL for cached upstream responses: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Per-call cache behavior.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// How long a freshly produced value stays valid.
    pub ttl: Duration,
    /// Skip the cache entirely: always produce, never read or write.
    pub bypass: bool,
    /// Per-key TTL taking precedence over `ttl` when set.
    pub ttl_override: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            bypass: false,
            ttl_override: None,
        }
    }
}

impl CachePolicy {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    pub fn bypass() -> Self {
        Self {
            bypass: true,
            ..Self::default()
        }
    }

    pub fn with_override(ttl_override: Duration) -> Self {
        Self {
            ttl_override: Some(ttl_override),
            ..Self::default()
        }
    }

    /// The TTL actually applied on a write.
    fn effective_ttl(&self) -> Duration {
        self.ttl_override.unwrap_or(self.ttl)
    }
}

/// Read-through cache for upstream API responses.
///
/// Each instance exclusively owns its store; construct one explicitly and
/// hand it to whichever component issues upstream calls rather than
/// sharing a process-wide singleton.
///
/// Concurrent `resolve` calls for the same absent or expired key are not
/// deduplicated: both will invoke their producer. Callers must tolerate
/// redundant upstream calls rather than rely on single-flight semantics.
#[derive(Debug, Default)]
pub struct ResponseCache {
    store: CacheStore,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key` with the default policy (5 minute TTL).
    pub async fn resolve<T, F, Fut>(&mut self, key: &str, produce: F) -> Result<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.resolve_with(key, produce, CachePolicy::default()).await
    }

    /// Resolve `key`: return the cached value if present and unexpired,
    /// otherwise invoke `produce`, store its result, and return it.
    ///
    /// The returned boolean is true when the value came from the cache.
    /// A failing producer propagates its error and writes nothing: a
    /// failed fetch never caches a failure nor refreshes a stale entry.
    pub async fn resolve_with<T, F, Fut>(
        &mut self,
        key: &str,
        produce: F,
        policy: CachePolicy,
    ) -> Result<(T, bool)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if policy.bypass {
            return Ok((produce().await?, false));
        }

        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired(Utc::now()) {
                let value = serde_json::from_value(entry.value.clone())?;
                return Ok((value, true));
            }
        }

        let value = produce().await?;

        let ttl = chrono::Duration::from_std(policy.effective_ttl())
            .unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        self.store.set(key, serde_json::to_value(&value)?, expires_at);

        debug!(
            key,
            entries = self.store.len(),
            bytes = self.store.approximate_byte_size(),
            "cached upstream response"
        );

        Ok((value, false))
    }

    /// Drop every cached entry. Called when upstream-facing configuration
    /// (credentials, target owner, API limits) changes at runtime, since
    /// every cached value may have been computed under the old
    /// configuration.
    pub fn bust_all(&mut self) {
        self.store.clear();
        debug!("cache cleared");
    }

    /// Number of cached entries. Observability only.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Approximate cached payload size in bytes. Observability only.
    pub fn approximate_byte_size(&self) -> usize {
        self.store.approximate_byte_size()
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut CacheStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmpereError;
    use std::cell::Cell;

    async fn produce_once(calls: &Cell<u32>, value: &str) -> Result<String> {
        calls.set(calls.get() + 1);
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        let (value, hit) = cache
            .resolve("octo/app/workflows", || produce_once(&calls, "fresh"))
            .await
            .unwrap();
        assert_eq!(value, "fresh");
        assert!(!hit);
        assert_eq!(calls.get(), 1);

        let (value, hit) = cache
            .resolve("octo/app/workflows", || produce_once(&calls, "ignored"))
            .await
            .unwrap();
        assert_eq!(value, "fresh");
        assert!(hit);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refreshes() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        cache
            .resolve("key", || produce_once(&calls, "first"))
            .await
            .unwrap();

        // Backdate the entry past its TTL.
        let entry = cache.store_mut().entry_mut("key").unwrap();
        entry.expires_at = Utc::now() - chrono::Duration::seconds(1);

        let (value, hit) = cache
            .resolve("key", || produce_once(&calls, "second"))
            .await
            .unwrap();
        assert_eq!(value, "second");
        assert!(!hit);
        assert_eq!(calls.get(), 2);

        // The refresh wrote a new entry, so the next call hits.
        let (value, hit) = cache
            .resolve("key", || produce_once(&calls, "ignored"))
            .await
            .unwrap();
        assert_eq!(value, "second");
        assert!(hit);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_bypass_always_produces_and_never_touches_store() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        cache
            .resolve("key", || produce_once(&calls, "cached"))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        let (value, hit) = cache
            .resolve_with("key", || produce_once(&calls, "live"), CachePolicy::bypass())
            .await
            .unwrap();
        assert_eq!(value, "live");
        assert!(!hit);
        assert_eq!(calls.get(), 2);

        // Bypass wrote nothing: the original entry is still served.
        let (value, hit) = cache
            .resolve("key", || produce_once(&calls, "ignored"))
            .await
            .unwrap();
        assert_eq!(value, "cached");
        assert!(hit);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_failed_producer_writes_nothing() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        let result: Result<(String, bool)> = cache
            .resolve("key", || async {
                calls.set(calls.get() + 1);
                Err(AmpereError::Other("upstream down".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());

        // The failure was not cached: the next resolve tries again.
        let (value, hit) = cache
            .resolve("key", || produce_once(&calls, "recovered"))
            .await
            .unwrap();
        assert_eq!(value, "recovered");
        assert!(!hit);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_ttl_override_takes_precedence() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        let policy = CachePolicy {
            ttl: Duration::from_secs(300),
            bypass: false,
            ttl_override: Some(Duration::from_secs(86_400)),
        };
        let before = Utc::now();
        cache
            .resolve_with("key", || produce_once(&calls, "v"), policy)
            .await
            .unwrap();

        let entry = cache.store_mut().entry_mut("key").unwrap();
        let min_expiry = before + chrono::Duration::seconds(86_000);
        assert!(entry.expires_at > min_expiry);
    }

    #[tokio::test]
    async fn test_enormous_ttl_saturates_instead_of_panicking() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        cache
            .resolve_with(
                "key",
                || produce_once(&calls, "v"),
                CachePolicy::ttl(Duration::MAX),
            )
            .await
            .unwrap();

        // The expiry clamps to the far future and the entry still hits.
        let (value, hit) = cache
            .resolve("key", || produce_once(&calls, "ignored"))
            .await
            .unwrap();
        assert_eq!(value, "v");
        assert!(hit);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_bust_all_forces_refetch() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);

        cache
            .resolve("key", || produce_once(&calls, "v1"))
            .await
            .unwrap();
        let (_, hit) = cache
            .resolve("key", || produce_once(&calls, "v1"))
            .await
            .unwrap();
        assert!(hit);

        cache.bust_all();
        assert!(cache.is_empty());

        let (_, hit) = cache
            .resolve("key", || produce_once(&calls, "v2"))
            .await
            .unwrap();
        assert!(!hit);
        assert_eq!(calls.get(), 2);
    }
}
