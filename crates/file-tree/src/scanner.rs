//! Recursive directory scanning

use crate::error::{Result, ScanError};
use crate::types::FileInfo;
use std::fs;
use std::path::Path;

/// Source of directory listings for a snapshot
pub trait Scanner: Send + Sync {
    /// List `dir` recursively, returning its children.
    ///
    /// Fails on the first directory or entry that cannot be read; no partial
    /// tree is returned.
    fn scan(&self, dir: &Path) -> Result<Vec<FileInfo>>;
}

/// Scans the local filesystem with `std::fs`.
///
/// Hidden entries (leading `.`) are skipped along with their subtrees and
/// siblings are sorted by name. Symlinks are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScanner;

impl Scanner for FsScanner {
    fn scan(&self, dir: &Path) -> Result<Vec<FileInfo>> {
        let listing = fs::read_dir(dir).map_err(|e| ScanError::read_dir(dir, e))?;

        let mut entries = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|e| ScanError::read_dir(dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) {
                continue;
            }
            entries.push((name, entry));
        }
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut items = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let full_path = dir.join(&name);
            let file_type = entry
                .file_type()
                .map_err(|e| ScanError::metadata(&full_path, e))?;

            if file_type.is_dir() {
                let children = self.scan(&full_path)?;
                items.push(FileInfo::folder(
                    name,
                    full_path.to_string_lossy(),
                    children,
                ));
            } else {
                let size = entry
                    .metadata()
                    .map_err(|e| ScanError::metadata(&full_path, e))?
                    .len();
                items.push(FileInfo::file(name, full_path.to_string_lossy(), size));
            }
        }

        Ok(items)
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
