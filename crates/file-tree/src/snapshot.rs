//! Cached snapshot of a directory tree

use crate::error::Result;
use crate::scanner::{FsScanner, Scanner};
use crate::types::FileInfo;
use expiring_cache::ExpiringCache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cache key under which the snapshot is stored
pub const SNAPSHOT_KEY: &str = "files";

/// Cache holding shared, immutable snapshots
pub type SnapshotCache = ExpiringCache<Arc<FileInfo>>;

/// How long a freshly scanned snapshot stays cached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotRetention {
    /// The cache's default TTL
    #[default]
    CacheDefault,
    Ttl(Duration),
    /// Until invalidated
    Permanent,
}

/// Serves the tree under `root`, scanning only on a cache miss.
///
/// Two callers that miss at the same time both scan and the later write
/// wins. Scans only read the filesystem, so this costs time but never
/// correctness.
pub struct SnapshotProvider {
    root: PathBuf,
    cache: Arc<SnapshotCache>,
    scanner: Arc<dyn Scanner>,
    retention: SnapshotRetention,
}

impl SnapshotProvider {
    pub fn new(root: impl Into<PathBuf>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            root: root.into(),
            cache,
            scanner: Arc::new(FsScanner),
            retention: SnapshotRetention::default(),
        }
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn Scanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_retention(mut self, retention: SnapshotRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Get the current snapshot, scanning and caching it on a miss.
    ///
    /// Scan failures are returned as-is and never cached.
    pub async fn get_snapshot(&self) -> Result<Arc<FileInfo>> {
        if let Some(snapshot) = self.cache.get(SNAPSHOT_KEY).await {
            return Ok(snapshot);
        }

        debug!(root = %self.root.display(), "Cache miss, scanning directory");

        let scanner = self.scanner.clone();
        let root = self.root.clone();
        let items = tokio::task::spawn_blocking(move || scanner.scan(&root)).await??;

        let label = self.root.to_string_lossy();
        let snapshot = Arc::new(FileInfo::folder(label.as_ref(), label.as_ref(), items));

        match self.retention {
            SnapshotRetention::CacheDefault => {
                self.cache.set(SNAPSHOT_KEY, snapshot.clone()).await
            }
            SnapshotRetention::Ttl(ttl) => {
                self.cache.set_ttl(SNAPSHOT_KEY, snapshot.clone(), ttl).await
            }
            SnapshotRetention::Permanent => {
                self.cache.set_permanent(SNAPSHOT_KEY, snapshot.clone()).await
            }
        }

        debug!(
            root = %self.root.display(),
            items = snapshot.children().len(),
            "Cached directory snapshot"
        );
        Ok(snapshot)
    }

    /// Drop the cached snapshot so the next lookup rescans
    pub async fn invalidate(&self) {
        self.cache.delete(SNAPSHOT_KEY).await;
        info!(root = %self.root.display(), "Snapshot invalidated");
    }
}
