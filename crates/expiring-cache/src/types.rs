//! Cache types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and the instant after which it is no longer served
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    /// `None` for permanent entries
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    pub fn permanent(value: V) -> Self {
        Self::new(value, None)
    }

    /// Whether the entry has expired as of `now`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.map(|t| now >= t).unwrap_or(false)
    }
}

/// Configuration for an [`ExpiringCache`](crate::ExpiringCache)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime applied by `set`
    pub default_ttl: Duration,
    /// Cadence of the background sweep; zero disables it
    pub reap_interval: Duration,
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(24 * 60 * 60), // 24 hours
            reap_interval: Duration::from_secs(60 * 60),    // 1 hour
        }
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries currently held, including expired ones not yet reaped
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
