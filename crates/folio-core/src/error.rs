//! Filesystem error shared by parsing, navigation and the pipeline.

use std::fmt;
use std::path::PathBuf;

/// Filesystem operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsOperation {
    Read,
    Stat,
    ReadDir,
    Write,
    CreateDir,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Read => "read",
            Self::Stat => "stat",
            Self::ReadDir => "read directory",
            Self::Write => "write",
            Self::CreateDir => "create directory",
        };
        f.write_str(op)
    }
}

/// Read, stat or write failure with the offending path.
#[derive(Debug, thiserror::Error)]
#[error("Failed to {operation} {}: {source}", path.display())]
pub struct FileSystemError {
    /// Path the operation was applied to.
    pub path: PathBuf,
    /// Operation that failed.
    pub operation: FsOperation,
    /// Underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

impl FileSystemError {
    #[must_use]
    pub fn new(operation: FsOperation, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            operation,
            source,
        }
    }

    /// True if the underlying error is `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == std::io::ErrorKind::NotFound
    }
}
