//! Error types for directory scanning

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ScanError {
    /// A directory could not be listed
    ReadDir { path: PathBuf, source: io::Error },
    /// An entry's metadata could not be read
    Metadata { path: PathBuf, source: io::Error },
    /// The blocking scan worker panicked or was cancelled
    Task(String),
}

impl ScanError {
    pub fn read_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadDir {
            path: path.into(),
            source,
        }
    }

    pub fn metadata(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::ReadDir { path, source } => {
                write!(f, "error scanning directory {}: {}", path.display(), source)
            }
            ScanError::Metadata { path, source } => write!(
                f,
                "error scanning directory: cannot stat {}: {}",
                path.display(),
                source
            ),
            ScanError::Task(msg) => write!(f, "error scanning directory: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::ReadDir { source, .. } | ScanError::Metadata { source, .. } => Some(source),
            ScanError::Task(_) => None,
        }
    }
}

impl From<tokio::task::JoinError> for ScanError {
    fn from(err: tokio::task::JoinError) -> Self {
        ScanError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
