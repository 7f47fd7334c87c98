//! Directory tree snapshots
//!
//! Walks a directory into an in-memory [`FileInfo`] tree and keeps the most
//! recent snapshot in an [`ExpiringCache`](expiring_cache::ExpiringCache) so
//! repeated lookups do not touch the filesystem.

mod error;
mod scanner;
mod snapshot;
mod types;

pub use error::{Result, ScanError};
pub use scanner::{FsScanner, Scanner};
pub use snapshot::{SnapshotCache, SnapshotProvider, SnapshotRetention, SNAPSHOT_KEY};
pub use types::{FileInfo, FileType};
