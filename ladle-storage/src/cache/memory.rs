//! Bounded in-memory tier.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CacheEntry, CacheKey};

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Insertion order, oldest first. Holds exactly the keys of `entries`.
    order: VecDeque<CacheKey>,
}

/// A map of at most `capacity` entries with first-in-first-out eviction.
///
/// Overwriting a key moves it to the back of the eviction queue.
#[derive(Debug)]
pub struct MemoryTier {
    capacity: usize,
    inner: RwLock<MemoryInner>,
}

impl MemoryTier {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(MemoryInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Poisoned locks are recovered.
    fn read(&self) -> RwLockReadGuard<'_, MemoryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.read().entries.get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.read().entries.contains_key(key)
    }

    /// Insert or replace an entry. Returns the number of entries evicted.
    pub fn insert(&self, key: CacheKey, entry: CacheEntry) -> u64 {
        let mut inner = self.write();
        if inner.entries.insert(key.clone(), entry).is_some() {
            inner.order.retain(|k| k != &key);
        }
        inner.order.push_back(key);

        let mut evicted = 0;
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    pub fn remove(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut inner = self.write();
        let removed = inner.entries.remove(key);
        if removed.is_some() {
            inner.order.retain(|k| k != key);
        }
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn entry(byte: u8) -> CacheEntry {
        CacheEntry::new(vec![byte], Duration::from_secs(60), Utc::now())
    }

    #[test]
    fn test_insert_and_get() {
        let tier = MemoryTier::new(4);
        tier.insert(CacheKey::new("a"), entry(1));
        assert_eq!(tier.get(&CacheKey::new("a")).unwrap().value_bytes, vec![1]);
        assert!(tier.get(&CacheKey::new("b")).is_none());
    }

    #[test]
    fn test_evicts_oldest_first() {
        let tier = MemoryTier::new(2);
        assert_eq!(tier.insert(CacheKey::new("a"), entry(1)), 0);
        assert_eq!(tier.insert(CacheKey::new("b"), entry(2)), 0);
        assert_eq!(tier.insert(CacheKey::new("c"), entry(3)), 1);

        assert!(!tier.contains(&CacheKey::new("a")));
        assert!(tier.contains(&CacheKey::new("b")));
        assert!(tier.contains(&CacheKey::new("c")));
        assert_eq!(tier.len(), 2);
    }

    #[test]
    fn test_overwrite_refreshes_position() {
        let tier = MemoryTier::new(2);
        tier.insert(CacheKey::new("a"), entry(1));
        tier.insert(CacheKey::new("b"), entry(2));
        tier.insert(CacheKey::new("a"), entry(9));
        tier.insert(CacheKey::new("c"), entry(3));

        assert!(tier.contains(&CacheKey::new("a")));
        assert!(!tier.contains(&CacheKey::new("b")));
        assert_eq!(tier.get(&CacheKey::new("a")).unwrap().value_bytes, vec![9]);
    }

    #[test]
    fn test_remove_and_clear() {
        let tier = MemoryTier::new(3);
        tier.insert(CacheKey::new("a"), entry(1));
        tier.insert(CacheKey::new("b"), entry(2));
        assert!(tier.remove(&CacheKey::new("a")).is_some());
        assert!(tier.remove(&CacheKey::new("a")).is_none());
        assert_eq!(tier.len(), 1);
        tier.clear();
        assert!(tier.is_empty());
    }
}
