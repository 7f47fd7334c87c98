//! In-memory TTL cache with a background reaper task

use crate::types::{CacheConfig, CacheEntry, CacheStats};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// A string-keyed cache whose entries expire after a per-entry TTL
///
/// Every operation goes through a single lock around the entry map, including
/// the sweeps made by the background reaper, so operations on the same key
/// are observed in one order by all callers.
pub struct ExpiringCache<V> {
    inner: Arc<Inner<V>>,
    /// Background reaper, taken by `close`
    reaper: Mutex<Option<Reaper>>,
}

struct Inner<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct Reaper {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache and start its reaper.
    ///
    /// Must be called from within a tokio runtime. A zero reap interval
    /// leaves the reaper off; expired entries are then only dropped on lookup
    /// or by calling [`reap`](Self::reap).
    pub fn new(config: CacheConfig) -> Self {
        let inner = Arc::new(Inner {
            entries: RwLock::new(HashMap::new()),
            default_ttl: config.default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        });

        let reaper = if config.reap_interval.is_zero() {
            None
        } else {
            Some(Reaper::spawn(inner.clone(), config.reap_interval))
        };

        debug!(
            default_ttl_secs = config.default_ttl.as_secs(),
            reap_interval_secs = config.reap_interval.as_secs(),
            "Cache created"
        );

        Self {
            inner,
            reaper: Mutex::new(reaper),
        }
    }

    /// Get a value, or `None` if it is absent or has expired
    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.inner.entries.read().await;
            match entries.get(key) {
                None => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
                Some(entry) if !entry.is_expired_at(Instant::now()) => {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Expired but not reaped yet. Another writer may have replaced the
        // entry between the two locks, so check again before removing.
        let mut entries = self.inner.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(Instant::now()))
        {
            entries.remove(key);
            debug!(key, "Cache entry expired");
        }
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or replace a value using the default TTL
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.set_ttl(key, value, self.inner.default_ttl).await;
    }

    /// Insert or replace a value that expires after `ttl`.
    ///
    /// A zero TTL expires the entry immediately. A TTL too large to be
    /// represented as an instant makes the entry permanent.
    pub async fn set_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.insert(key.into(), CacheEntry::new(value, expires_at)).await;
    }

    /// Insert or replace a value that never expires
    pub async fn set_permanent(&self, key: impl Into<String>, value: V) {
        self.insert(key.into(), CacheEntry::permanent(value)).await;
    }

    async fn insert(&self, key: String, entry: CacheEntry<V>) {
        let mut entries = self.inner.entries.write().await;
        entries.insert(key, entry);
    }

    /// Remove an entry; absent keys are ignored
    pub async fn delete(&self, key: &str) {
        let mut entries = self.inner.entries.write().await;
        entries.remove(key);
    }

    /// Remove every expired entry now, returning how many were removed
    pub async fn reap(&self) -> usize {
        self.inner.reap().await
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.inner.entries.read().await;
        CacheStats {
            entries: entries.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }
}

impl<V> ExpiringCache<V> {
    /// Stop the background reaper and wait for it to exit.
    ///
    /// Safe to call more than once; later calls return immediately. No reap
    /// runs after the first call returns.
    pub async fn close(&self) {
        let reaper = self.reaper.lock().await.take();
        if let Some(reaper) = reaper {
            let _ = reaper.shutdown.send(());
            if let Err(e) = reaper.handle.await {
                warn!(error = %e, "Cache reaper did not stop cleanly");
            }
            debug!("Cache closed");
        }
    }
}

impl<V> Drop for ExpiringCache<V> {
    fn drop(&mut self) {
        if let Some(reaper) = self.reaper.get_mut().take() {
            reaper.handle.abort();
        }
    }
}

impl<V> Inner<V> {
    async fn reap(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Reaped expired cache entries");
        }
        removed
    }
}

impl Reaper {
    fn spawn<V>(inner: Arc<Inner<V>>, period: Duration) -> Self
    where
        V: Send + Sync + 'static,
    {
        let (shutdown, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        inner.reap().await;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }
}
