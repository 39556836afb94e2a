//! LADLE Storage - Codec, Cache and Plan Store
//!
//! Everything that turns values into bytes and keeps them around: the
//! self-describing value codec, the two-tier expiring cache used in front of
//! the recipe source, and the plan store that generation commits into.

pub mod cache;
pub mod codec;
pub mod plan_store;

pub use cache::{
    CacheEntry, CacheKey, CacheStats, FsTier, MemoryTier, PersistentTier, TtlPolicy, TwoTierCache,
};
pub use codec::{decode, decode_value, encode, CacheValue, CodecError, UNRECOGNIZED_SHAPE};
pub use plan_store::{InMemoryPlanStore, PlanStore};
