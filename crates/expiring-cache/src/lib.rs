//! Generic in-memory cache with TTL expiration and background reaping
//!
//! Entries carry an optional expiry instant. Expired entries are never
//! returned by lookups, and a background task periodically sweeps them out
//! of the map until the cache is closed.

mod cache;
mod types;

pub use cache::ExpiringCache;
pub use types::{CacheConfig, CacheEntry, CacheStats};
