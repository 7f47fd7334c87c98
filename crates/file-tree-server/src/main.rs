//! File tree server
//!
//! Serves a JSON snapshot of a directory tree at /files.json, caching the
//! scan so repeated requests do not walk the filesystem, alongside the files
//! themselves and a static frontend.

mod config;
mod error;
mod server;
mod types;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::server::{shutdown_signal, start_server, ServerState, SharedState};
use expiring_cache::ExpiringCache;
use file_tree::SnapshotProvider;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("file_tree_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting file tree server...");

    let config = ServerConfig::from_env();
    info!("Port: {}", config.port);
    info!("Files dir: {:?}", config.files_dir);
    info!("Static dir: {:?}", config.static_dir);
    info!(
        "Cache TTL: {} seconds (permanent snapshot: {})",
        config.cache_ttl_secs, config.snapshot_permanent
    );
    info!("Cache reap interval: {} seconds", config.reap_interval_secs);

    let cache = Arc::new(ExpiringCache::new(config.cache_config()));
    let snapshots = SnapshotProvider::new(&config.files_dir, cache.clone())
        .with_retention(config.retention());

    // Warm the snapshot so the first request is a cache hit
    match snapshots.get_snapshot().await {
        Ok(snapshot) => info!(items = snapshot.children().len(), "Snapshot warmed"),
        Err(e) => warn!(error = %e, "Initial scan failed, will retry on first request"),
    }

    let state: SharedState = Arc::new(ServerState::new(snapshots));

    // Runs until SIGINT/SIGTERM, then stops accepting connections
    let served = start_server(state, &config.static_dir, config.port, shutdown_signal()).await;
    info!("Server shut down complete");

    cache.close().await;

    served?;
    Ok(())
}
