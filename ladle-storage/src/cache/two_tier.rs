//! Memory-over-disk cache with lazy expiry.
//!
//! Writes go to both tiers. Reads try memory, then disk; a disk hit is
//! promoted into memory. Expiry is checked on read and expired entries are
//! purged from whichever tier held them. Persistent tier failures never reach
//! the caller: they are logged, counted, and the operation degrades to a miss
//! or a no-op.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use ladle_core::{CacheError, CacheSettings};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheEntry, CacheKey, CacheStats, FsTier, MemoryTier, PersistentTier};
use crate::codec::{self, CacheValue};

/// Two-tier expiring cache.
pub struct TwoTierCache {
    memory: MemoryTier,
    disk: Arc<dyn PersistentTier>,
    stats: RwLock<CacheStats>,
}

impl std::fmt::Debug for TwoTierCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoTierCache")
            .field("memory", &self.memory)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

enum Lookup {
    Hit(CacheEntry),
    Expired,
    Miss,
}

impl TwoTierCache {
    pub fn new(memory_capacity: usize, disk: Arc<dyn PersistentTier>) -> Self {
        Self {
            memory: MemoryTier::new(memory_capacity),
            disk,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Cache backed by files in the configured directory.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        let root = settings.resolved_directory();
        tracing::debug!(path = %root.display(), naming = ?settings.file_naming, "opening recipe cache");
        let disk = FsTier::new(root, settings.file_naming);
        Self::new(settings.memory_capacity, Arc::new(disk))
    }

    /// Store `value` under `key` for `ttl`.
    ///
    /// A zero `ttl` stores an entry that is already expired. Values that
    /// cannot be encoded are logged and not stored.
    pub async fn put<T: Serialize + Sync + ?Sized>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let bytes = match codec::encode(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache value not encodable, skipping");
                return;
            }
        };
        let entry = CacheEntry::new(bytes, ttl, Utc::now());

        let evicted = self.memory.insert(key.clone(), entry.clone());
        if evicted > 0 {
            self.record(|s| s.evictions += evicted);
        }

        if let Err(e) = self.disk.write(key, &entry).await {
            self.disk_failure("write", key, &e);
        }
    }

    /// Fetch the value for `key` as `T`.
    ///
    /// Returns `None` when the key is absent, expired, unreadable, or stored
    /// with a shape that does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let entry = self.lookup(key).await?;
        match codec::decode(&entry.value_bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "cached value has unexpected shape");
                None
            }
        }
    }

    /// Fetch the value for `key` without a static type.
    pub async fn get_value(&self, key: &CacheKey) -> Option<CacheValue> {
        self.get::<CacheValue>(key).await
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Utc::now();

        let expired_in_memory = match self.memory_lookup(key, now) {
            Lookup::Hit(entry) => {
                self.record(|s| s.memory_hits += 1);
                return Some(entry);
            }
            Lookup::Expired => {
                self.memory.remove(key);
                self.record(|s| s.expired += 1);
                true
            }
            Lookup::Miss => false,
        };

        let entry = match self.disk.read(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.record(|s| s.misses += 1);
                return None;
            }
            Err(e) => {
                if matches!(e, CacheError::Codec { .. }) {
                    self.purge_disk(key).await;
                }
                self.disk_failure("read", key, &e);
                self.record(|s| s.misses += 1);
                return None;
            }
        };

        if !entry.is_valid_at(now) {
            self.purge_disk(key).await;
            // One expiry per lookup, even when both tiers held the entry.
            self.record(|s| {
                if !expired_in_memory {
                    s.expired += 1;
                }
                s.misses += 1;
            });
            return None;
        }

        let evicted = self.memory.insert(key.clone(), entry.clone());
        self.record(|s| {
            s.disk_hits += 1;
            s.evictions += evicted;
        });
        Some(entry)
    }

    fn memory_lookup(&self, key: &CacheKey, now: chrono::DateTime<Utc>) -> Lookup {
        match self.memory.get(key) {
            Some(entry) if entry.is_valid_at(now) => Lookup::Hit(entry),
            Some(_) => Lookup::Expired,
            None => Lookup::Miss,
        }
    }

    /// Remove `key` from both tiers.
    pub async fn remove(&self, key: &CacheKey) {
        self.memory.remove(key);
        if let Err(e) = self.disk.delete(key).await {
            self.disk_failure("delete", key, &e);
        }
    }

    /// Empty both tiers.
    pub async fn clear(&self) {
        self.memory.clear();
        match self.disk.clear().await {
            Ok(removed) => tracing::debug!(removed, "cache cleared"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear persistent cache tier");
                self.record(|s| s.disk_errors += 1);
            }
        }
    }

    /// Snapshot of the counters, with the current memory entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self
            .stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        stats.entry_count = self.memory.len() as u64;
        stats
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// True if `key` is resident in the memory tier, expired or not.
    pub fn contains_in_memory(&self, key: &CacheKey) -> bool {
        self.memory.contains(key)
    }

    async fn purge_disk(&self, key: &CacheKey) {
        if let Err(e) = self.disk.delete(key).await {
            self.disk_failure("delete", key, &e);
        }
    }

    fn disk_failure(&self, op: &'static str, key: &CacheKey, err: &CacheError) {
        tracing::warn!(op, key = %key, error = %err, "persistent cache tier failure");
        self.record(|s| s.disk_errors += 1);
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ladle_core::{CacheFileNaming, Fingerprint, SearchResults};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    /// Persistent tier that fails every operation.
    struct FailingTier;

    #[async_trait]
    impl PersistentTier for FailingTier {
        async fn read(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
            Err(io_err())
        }
        async fn write(&self, _key: &CacheKey, _entry: &CacheEntry) -> Result<(), CacheError> {
            Err(io_err())
        }
        async fn delete(&self, _key: &CacheKey) -> Result<(), CacheError> {
            Err(io_err())
        }
        async fn clear(&self) -> Result<u64, CacheError> {
            Err(io_err())
        }
    }

    fn io_err() -> CacheError {
        CacheError::Io {
            path: PathBuf::from("/unwritable"),
            reason: "permission denied".to_string(),
        }
    }

    /// Persistent tier holding entries in a map.
    #[derive(Default)]
    struct MapTier {
        entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    }

    #[async_trait]
    impl PersistentTier for MapTier {
        async fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }
        async fn write(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
            self.entries.lock().unwrap().insert(key.clone(), entry.clone());
            Ok(())
        }
        async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
        async fn clear(&self) -> Result<u64, CacheError> {
            let mut entries = self.entries.lock().unwrap();
            let n = entries.len() as u64;
            entries.clear();
            Ok(n)
        }
    }

    fn fs_cache(dir: &TempDir, capacity: usize) -> TwoTierCache {
        TwoTierCache::new(
            capacity,
            Arc::new(FsTier::new(dir.path(), CacheFileNaming::Raw)),
        )
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 100);
        let key = CacheKey::new("greeting");

        cache.put(&key, "hello", HOUR).await;
        assert_eq!(cache.get::<String>(&key).await.as_deref(), Some("hello"));
        assert_eq!(cache.stats().memory_hits, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_readable() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 100);
        let key = CacheKey::new("gone");

        cache.put(&key, &1, Duration::ZERO).await;
        assert!(cache.get::<i64>(&key).await.is_none());
        assert!(!cache.contains_in_memory(&key));
        assert!(!dir.path().join("gone").exists());
        let stats = cache.stats();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_disk_hit_is_promoted() {
        let dir = TempDir::new().unwrap();
        let key = CacheKey::recipe(42);

        let first = fs_cache(&dir, 100);
        first.put(&key, &vec![1, 2, 3], HOUR).await;
        drop(first);

        let second = fs_cache(&dir, 100);
        assert!(!second.contains_in_memory(&key));
        assert_eq!(second.get::<Vec<i32>>(&key).await, Some(vec![1, 2, 3]));
        assert!(second.contains_in_memory(&key));

        assert_eq!(second.get::<Vec<i32>>(&key).await, Some(vec![1, 2, 3]));
        let stats = second.stats();
        assert_eq!(stats.disk_hits, 1);
        assert_eq!(stats.memory_hits, 1);
    }

    #[tokio::test]
    async fn test_memory_bounded_disk_retains_all() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 100);

        for i in 0..101 {
            cache.put(&CacheKey::new(format!("k{i}")), &i, HOUR).await;
        }

        assert_eq!(cache.memory_len(), 100);
        assert!(!cache.contains_in_memory(&CacheKey::new("k0")));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.get::<i32>(&CacheKey::new("k0")).await, Some(0));
        assert_eq!(cache.stats().disk_hits, 1);
    }

    #[tokio::test]
    async fn test_failing_disk_tier_is_swallowed() {
        let cache = TwoTierCache::new(10, Arc::new(FailingTier));
        let key = CacheKey::new("k");

        cache.put(&key, "v", HOUR).await;
        assert_eq!(cache.get::<String>(&key).await.as_deref(), Some("v"));
        assert!(cache.get::<String>(&CacheKey::new("other")).await.is_none());
        cache.remove(&key).await;
        cache.clear().await;

        let stats = cache.stats();
        assert!(stats.disk_errors >= 4);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_expired_disk_entry_is_purged() {
        let tier = Arc::new(MapTier::default());
        let cache = TwoTierCache::new(10, tier.clone());
        let key = CacheKey::new("old");

        let stale = CacheEntry::new(codec::encode(&5).unwrap(), Duration::ZERO, Utc::now());
        tier.write(&key, &stale).await.unwrap();

        assert!(cache.get::<i32>(&key).await.is_none());
        assert!(tier.read(&key).await.unwrap().is_none());
        assert_eq!(cache.stats().expired, 1);
    }

    #[tokio::test]
    async fn test_expiry_in_both_tiers_counted_once() {
        let tier = Arc::new(MapTier::default());
        let cache = TwoTierCache::new(10, tier.clone());
        let key = CacheKey::new("stale");

        cache.put(&key, &5, Duration::ZERO).await;
        assert!(cache.contains_in_memory(&key));
        assert!(tier.read(&key).await.unwrap().is_some());

        assert!(cache.get::<i32>(&key).await.is_none());
        let stats = cache.stats();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
        assert!(!cache.contains_in_memory(&key));
        assert!(tier.read(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_disk_entry_is_purged() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 10);
        std::fs::write(dir.path().join("junk"), b"{{{").unwrap();

        assert!(cache.get_value(&CacheKey::new("junk")).await.is_none());
        assert!(!dir.path().join("junk").exists());
    }

    #[tokio::test]
    async fn test_unwritable_key_still_cached_in_memory() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 10);
        let key = CacheKey::search(&Fingerprint::query("a/b"));

        cache.put(&key, &1, HOUR).await;
        assert_eq!(cache.get::<i32>(&key).await, Some(1));
        assert_eq!(cache.stats().disk_errors, 1);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 10);
        let key = CacheKey::new("n");

        cache.put(&key, &[1, 2], HOUR).await;
        assert!(cache.get::<SearchResults>(&key).await.is_none());
        assert_eq!(
            cache.get_value(&key).await,
            Some(CacheValue::Sequence(vec![CacheValue::Int(1), CacheValue::Int(2)]))
        );
    }

    #[tokio::test]
    async fn test_non_finite_value_not_stored() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 10);
        let key = CacheKey::new("nan");

        cache.put(&key, &CacheValue::Float(f64::NAN), HOUR).await;
        assert!(!cache.contains_in_memory(&key));
        assert!(cache.get_value(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let cache = fs_cache(&dir, 10);
        let a = CacheKey::new("a");
        let b = CacheKey::new("b");
        cache.put(&a, &1, HOUR).await;
        cache.put(&b, &2, HOUR).await;

        cache.remove(&a).await;
        assert!(cache.get::<i32>(&a).await.is_none());
        assert!(!dir.path().join("a").exists());

        cache.clear().await;
        assert!(cache.get::<i32>(&b).await.is_none());
        assert_eq!(cache.memory_len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(fs_cache(&dir, 100));

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = CacheKey::new(format!("c{i}"));
                cache.put(&key, &i, HOUR).await;
                cache.get::<i32>(&key).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(i as i32));
        }
    }
}
