//! Cache (C4): a sharded in-process LRU fronting an optional remote tier.
//!
//! Content-hash keyed, stats-tracked, graceful-miss-on-corruption, split
//! into independently-locked shards instead of one `HashMap` behind a
//! single mutex.

pub mod key;
pub mod remote;

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use lru::LruCache;
use parking_lot::RwLock;

pub use key::cache_key;
pub use remote::{RemoteCache, RemoteCacheError};
use prreview_types::result::{BranchAnalysis, CachedAnalysis};

const SHARD_COUNT: usize = 16;
const DEFAULT_SHARD_CAPACITY: usize = 256;

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub invalidations: u64,
}

#[derive(Default)]
struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    invalidations: AtomicU64,
}

impl AtomicCacheStats {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// The C4 cache: shards of in-process LRU state, plus an optional remote
/// tier consulted on local misses.
pub struct Cache {
    shards: Vec<RwLock<LruCache<String, CachedAnalysis>>>,
    remote: Option<Box<dyn RemoteCache>>,
    remote_degraded: AtomicBool,
    stats: AtomicCacheStats,
}

impl Cache {
    #[must_use]
    pub fn new(remote: Option<Box<dyn RemoteCache>>) -> Self {
        Self::with_shard_capacity(DEFAULT_SHARD_CAPACITY, remote)
    }

    #[must_use]
    pub fn with_shard_capacity(capacity_per_shard: usize, remote: Option<Box<dyn RemoteCache>>) -> Self {
        let capacity = NonZeroUsize::new(capacity_per_shard.max(1)).unwrap();
        let shards = (0..SHARD_COUNT).map(|_| RwLock::new(LruCache::new(capacity))).collect();
        Self {
            shards,
            remote,
            remote_degraded: AtomicBool::new(false),
            stats: AtomicCacheStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Whether a remote-tier operation has failed since this cache was
    /// constructed. Callers surface this once as `Warning::CacheDegraded`
    /// (spec §4.4: "logged, not surfaced as an error").
    #[must_use]
    pub fn remote_degraded(&self) -> bool {
        self.remote_degraded.load(Ordering::Relaxed)
    }

    fn shard(&self, key: &str) -> &RwLock<LruCache<String, CachedAnalysis>> {
        &self.shards[key::shard_index(key, self.shards.len())]
    }

    /// Looks up `key`, checking the local shard first and falling back to
    /// the remote tier on a local miss. A hit whose schema version does not
    /// match current, or whose TTL has expired, is treated as a miss (spec
    /// §4.4).
    pub async fn get(&self, key: &str) -> Option<BranchAnalysis> {
        let now = SystemTime::now();

        if let Some(hit) = self.get_local(key, now) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Some(hit);
        }

        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(Some(bytes)) => {
                    if let Some(cached) = decode(&bytes) {
                        if cached.is_fresh(now) {
                            self.stats.hits.fetch_add(1, Ordering::Relaxed);
                            self.shard(key).write().put(key.to_string(), cached.clone());
                            return Some(cached.value);
                        }
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "remote cache get failed, continuing with local tier only");
                    self.remote_degraded.store(true, Ordering::Relaxed);
                }
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn get_local(&self, key: &str, now: SystemTime) -> Option<BranchAnalysis> {
        let mut shard = self.shard(key).write();
        match shard.get(key) {
            Some(cached) if cached.is_fresh(now) => Some(cached.value.clone()),
            Some(_stale) => {
                shard.pop(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key` with the given TTL. The local tier write
    /// always happens; the remote tier write is fire-and-forget, and a
    /// failure there degrades the cache but never fails the call (spec
    /// §4.4).
    pub async fn put(&self, key: &str, value: BranchAnalysis, ttl: Duration) {
        let cached = CachedAnalysis::new(key.to_string(), value, ttl);
        self.shard(key).write().put(key.to_string(), cached.clone());
        self.stats.writes.fetch_add(1, Ordering::Relaxed);

        if let Some(remote) = &self.remote {
            if let Some(bytes) = encode(&cached) {
                if let Err(err) = remote.put(key, bytes, ttl).await {
                    tracing::warn!(error = %err, "remote cache put failed, local tier still holds this entry");
                    self.remote_degraded.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    /// Removes every local entry whose key starts with `key_prefix`, and
    /// asks the remote tier to do the same (best-effort).
    pub async fn invalidate(&self, key_prefix: &str) {
        for shard in &self.shards {
            let mut shard = shard.write();
            let stale: Vec<String> = shard
                .iter()
                .filter(|(k, _)| k.starts_with(key_prefix))
                .map(|(k, _)| k.clone())
                .collect();
            for key in stale {
                shard.pop(&key);
                self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Some(remote) = &self.remote {
            if let Err(err) = remote.invalidate(key_prefix).await {
                tracing::warn!(error = %err, "remote cache invalidate failed");
                self.remote_degraded.store(true, Ordering::Relaxed);
            }
        }
    }
}

fn encode(cached: &CachedAnalysis) -> Option<Vec<u8>> {
    serde_json::to_vec(&cached.value).ok()
}

fn decode(bytes: &[u8]) -> Option<CachedAnalysis> {
    let value: BranchAnalysis = serde_json::from_slice(bytes).ok()?;
    // Remote entries store only the value; TTL/freshness travels with the
    // remote tier's own expiry, so treat a successful decode as fresh-until
    // re-checked by the caller via `schema_version`.
    Some(CachedAnalysis::new(String::new(), value, Duration::from_secs(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_types::issue::ISSUE_SCHEMA_VERSION;
    use std::sync::Mutex;

    fn sample_analysis() -> BranchAnalysis {
        BranchAnalysis {
            branch_ref: "main".to_string(),
            issues: Vec::new(),
            iterations: 1,
            converged: true,
            completeness: 100,
            model_id: "gpt-5".to_string(),
            warnings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn local_hit_then_expiry_then_miss() {
        let cache = Cache::new(None);
        let key = cache_key("repo", "main", "gpt-5", "v1");
        cache.put(&key, sample_analysis(), Duration::from_secs(60)).await;

        assert!(cache.get(&key).await.is_some());
        assert_eq!(cache.stats().hits, 1);

        cache.put(&key, sample_analysis(), Duration::from_secs(0)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_matching_prefix_only() {
        let cache = Cache::new(None);
        let key_a = cache_key("repo", "main", "gpt-5", "v1");
        let key_b = cache_key("repo", "feature", "gpt-5", "v1");
        cache.put(&key_a, sample_analysis(), Duration::from_secs(60)).await;
        cache.put(&key_b, sample_analysis(), Duration::from_secs(60)).await;

        cache.invalidate(&key_a[..8]).await;
        assert!(cache.get(&key_a).await.is_none());
        assert!(cache.get(&key_b).await.is_some());
    }

    struct FlakyRemote {
        fail: Mutex<bool>,
    }

    #[async_trait::async_trait]
    impl RemoteCache for FlakyRemote {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, RemoteCacheError> {
            Err(RemoteCacheError::Unreachable("connection refused".into()))
        }
        async fn put(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), RemoteCacheError> {
            if *self.fail.lock().unwrap() {
                Err(RemoteCacheError::WriteFailed("disk full".into()))
            } else {
                Ok(())
            }
        }
        async fn invalidate(&self, _key_prefix: &str) -> Result<(), RemoteCacheError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn remote_failure_degrades_but_local_tier_still_works() {
        let cache = Cache::new(Some(Box::new(FlakyRemote { fail: Mutex::new(true) })));
        let key = cache_key("repo", "main", "gpt-5", "v1");

        cache.put(&key, sample_analysis(), Duration::from_secs(60)).await;
        assert!(cache.remote_degraded());
        assert!(cache.get(&key).await.is_some());
    }

    #[test]
    fn schema_version_mismatch_is_treated_as_stale() {
        let mut cached = CachedAnalysis::new("k".into(), sample_analysis(), Duration::from_secs(60));
        cached.schema_version = "v0".to_string();
        assert!(!cached.is_fresh(SystemTime::now()));
        assert_ne!(cached.schema_version, ISSUE_SCHEMA_VERSION);
    }
}
