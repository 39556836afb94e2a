//! Persistent tier trait and cache statistics.

use async_trait::async_trait;
use ladle_core::CacheError;

use super::{CacheEntry, CacheKey};

/// The durable tier behind the in-memory map.
///
/// Implementations report failures; the cache decides what to do with them.
/// Reads of missing keys are `Ok(None)`, not errors.
#[async_trait]
pub trait PersistentTier: Send + Sync {
    /// Read the entry stored for `key`, expired or not.
    async fn read(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn write(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Delete the entry for `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError>;

    /// Delete every entry. Returns how many were removed.
    async fn clear(&self) -> Result<u64, CacheError>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered by the memory tier.
    pub memory_hits: u64,
    /// Reads answered by the disk tier (and promoted).
    pub disk_hits: u64,
    /// Reads that returned nothing.
    pub misses: u64,
    /// Memory entries dropped to stay within capacity.
    pub evictions: u64,
    /// Entries found past their expiry and purged.
    pub expired: u64,
    /// Persistent tier failures that were logged and swallowed.
    pub disk_errors: u64,
    /// Entries currently in the memory tier.
    pub entry_count: u64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.memory_hits + self.disk_hits
    }

    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}
