//! Server configuration from environment variables

use expiring_cache::CacheConfig;
use file_tree::SnapshotRetention;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory scanned for the snapshot and served under /files/
    pub files_dir: PathBuf,
    /// Directory served for every other path
    pub static_dir: PathBuf,
    pub cache_ttl_secs: u64,
    /// Zero disables background reaping
    pub reap_interval_secs: u64,
    /// Keep the snapshot until invalidated instead of applying the TTL
    pub snapshot_permanent: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            files_dir: PathBuf::from("files"),
            static_dir: PathBuf::from("static"),
            cache_ttl_secs: 24 * 60 * 60,     // 24 hours
            reap_interval_secs: 60 * 60,      // 1 hour
            snapshot_permanent: false,
        }
    }
}

impl ServerConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration from any variable source; unparsable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let files_dir = lookup("FILES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.files_dir);

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let cache_ttl_secs = lookup("CACHE_TTL_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cache_ttl_secs);

        let reap_interval_secs = lookup("CACHE_REAP_INTERVAL_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.reap_interval_secs);

        let snapshot_permanent = lookup("SNAPSHOT_PERMANENT")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.snapshot_permanent);

        Self {
            port,
            files_dir,
            static_dir,
            cache_ttl_secs,
            reap_interval_secs,
            snapshot_permanent,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_reap_interval(Duration::from_secs(self.reap_interval_secs))
    }

    pub fn retention(&self) -> SnapshotRetention {
        if self.snapshot_permanent {
            SnapshotRetention::Permanent
        } else {
            SnapshotRetention::CacheDefault
        }
    }
}
