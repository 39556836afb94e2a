//! Two-tier expiring cache.
//!
//! A bounded in-memory map sits in front of a persistent tier. Entries carry
//! an absolute expiry and are checked lazily on read; nothing sweeps in the
//! background.
//!
//! # Example
//!
//! ```ignore
//! let cache = TwoTierCache::from_settings(&config.cache);
//! let key = CacheKey::search(&fingerprint);
//!
//! if let Some(results) = cache.get::<SearchResults>(&key).await {
//!     return Ok(results);
//! }
//! let results = source.search(&fingerprint).await?;
//! cache.put(&key, &results, config.cache.search_ttl()).await;
//! ```

pub mod disk;
pub mod entry;
pub mod key;
pub mod memory;
pub mod traits;
pub mod ttl;
pub mod two_tier;

pub use disk::FsTier;
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use memory::MemoryTier;
pub use traits::{CacheStats, PersistentTier};
pub use ttl::TtlPolicy;
pub use two_tier::TwoTierCache;
