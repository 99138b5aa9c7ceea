//! Source tree filtering shared by document discovery and navigation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One accepted directory entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Selects documents below a source root by extension and ignore list.
#[derive(Clone, Copy, Debug)]
pub struct SourceFilter<'a> {
    root: &'a Path,
    extensions: &'a [String],
    ignore: &'a [String],
}

impl<'a> SourceFilter<'a> {
    #[must_use]
    pub fn new(root: &'a Path, extensions: &'a [String], ignore: &'a [String]) -> Self {
        Self {
            root,
            extensions,
            ignore,
        }
    }

    #[must_use]
    pub fn root(&self) -> &'a Path {
        self.root
    }

    /// Entries of `dir` sorted by name.
    ///
    /// Dotfiles, dot-directories and ignored entries are skipped. Entries
    /// whose metadata cannot be read are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails if `dir` itself cannot be listed.
    pub fn entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if self.is_ignored(&name, &path) {
                continue;
            }
            let is_dir = match entry.file_type() {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            entries.push(SourceEntry { name, path, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// True if `name` or the root-relative path of `path` is in the ignore
    /// list. Surrounding slashes in ignore entries are not significant.
    #[must_use]
    pub fn is_ignored(&self, name: &str, path: &Path) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        let rel = self.relative(path);
        self.ignore
            .iter()
            .map(|pattern| pattern.trim_matches('/'))
            .any(|pattern| pattern == name || pattern == rel)
    }

    /// True if the extension is selected (case-insensitive).
    #[must_use]
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    #[must_use]
    pub fn relative(&self, path: &Path) -> String {
        relative_path(self.root, path)
    }
}

/// `path` relative to `root`, joined with forward slashes.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
