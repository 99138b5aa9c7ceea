//! Source document discovery.

use std::path::{Path, PathBuf};

use folio_core::{FileSystemError, FsOperation, SourceFilter};

/// Recursively collect documents under `root`.
///
/// Within each directory, files come first sorted by name, then each
/// subdirectory sorted by name. Dotfiles, dot-directories and entries whose
/// name or root-relative path is in `ignore` are skipped. Unreadable
/// subdirectories and entries are logged and skipped.
///
/// # Errors
///
/// Fails if `root` itself cannot be listed.
pub fn discover(
    root: &Path,
    extensions: &[String],
    ignore: &[String],
) -> Result<Vec<PathBuf>, FileSystemError> {
    let filter = SourceFilter::new(root, extensions, ignore);
    let mut found = Vec::new();
    walk(&filter, root, &mut found)
        .map_err(|e| FileSystemError::new(FsOperation::ReadDir, root, e))?;
    Ok(found)
}

fn walk(filter: &SourceFilter<'_>, dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut subdirs = Vec::new();
    for entry in filter.entries(dir)? {
        if entry.is_dir {
            subdirs.push(entry.path);
        } else if filter.is_document(&entry.path) {
            found.push(entry.path);
        }
    }
    for subdir in subdirs {
        if let Err(e) = walk(filter, &subdir, found) {
            tracing::warn!(path = %subdir.display(), error = %e, "skipping unreadable directory");
        }
    }
    Ok(())
}
