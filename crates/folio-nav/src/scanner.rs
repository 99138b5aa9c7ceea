//! Directory listing for navigation.
//!
//! Lists one directory at a time; the generator decides how to recurse.
//! Entries are sorted by file name so traversal is deterministic.

use std::io;
use std::path::{Path, PathBuf};

use folio_core::SourceFilter;

/// File stems that make a document represent its directory.
const INDEX_STEM: &str = "index";
const README_STEM: &str = "readme";

/// Documents and subdirectories of one directory.
#[derive(Debug, Default)]
pub(crate) struct Listing {
    /// Document promoted to represent the directory.
    pub index: Option<PathBuf>,
    /// Remaining documents, sorted by file name.
    pub documents: Vec<PathBuf>,
    /// Subdirectories, sorted by name.
    pub directories: Vec<PathBuf>,
}

/// Entry filter shared by every directory of one scan.
pub(crate) struct Scanner<'a> {
    filter: SourceFilter<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &'a Path, extensions: &'a [String], ignore: &'a [String]) -> Self {
        Self {
            filter: SourceFilter::new(root, extensions, ignore),
        }
    }

    /// List a directory.
    ///
    /// Skips dotfiles, dot-directories, ignored names and files whose
    /// extension is not selected. `index.*` wins over `readme.*` when both
    /// are present; the loser stays a regular document.
    pub fn list(&self, dir: &Path) -> io::Result<Listing> {
        let mut listing = Listing::default();
        let mut readme: Option<PathBuf> = None;
        for entry in self.filter.entries(dir)? {
            if entry.is_dir {
                listing.directories.push(entry.path);
                continue;
            }
            if !self.filter.is_document(&entry.path) {
                continue;
            }
            match stem_lowercase(&entry.path).as_deref() {
                Some(INDEX_STEM) if listing.index.is_none() => listing.index = Some(entry.path),
                Some(README_STEM) if readme.is_none() => readme = Some(entry.path),
                _ => listing.documents.push(entry.path),
            }
        }

        match (&listing.index, readme) {
            (None, Some(readme)) => listing.index = Some(readme),
            (Some(_), Some(readme)) => {
                listing.documents.push(readme);
                listing.documents.sort_by_key(|p| p.file_name().map(ToOwned::to_owned));
            }
            (_, None) => {}
        }
        Ok(listing)
    }

    /// Path relative to the scan root with forward slashes.
    pub fn relative(&self, path: &Path) -> String {
        self.filter.relative(path)
    }
}

fn stem_lowercase(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn extensions() -> Vec<String> {
        vec!["md".to_owned(), "yaml".to_owned()]
    }

    #[test]
    fn test_list_sorts_and_filters() {
        let temp = tempfile::tempdir().unwrap();
        for name in ["zeta.md", "alpha.md", "notes.txt", ".hidden.md", "spec.YAML"] {
            fs::write(temp.path().join(name), "x").unwrap();
        }
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let extensions = extensions();
        let scanner = Scanner::new(temp.path(), &extensions, &[]);
        let listing = scanner.list(temp.path()).unwrap();

        assert!(listing.index.is_none());
        assert_eq!(names(&listing.documents), vec!["alpha.md", "spec.YAML", "zeta.md"]);
        assert_eq!(names(&listing.directories), vec!["a", "b"]);
    }

    #[test]
    fn test_index_wins_over_readme() {
        let temp = tempfile::tempdir().unwrap();
        for name in ["README.md", "Index.md", "guide.md"] {
            fs::write(temp.path().join(name), "x").unwrap();
        }

        let extensions = extensions();
        let scanner = Scanner::new(temp.path(), &extensions, &[]);
        let listing = scanner.list(temp.path()).unwrap();

        assert!(listing.index.unwrap().ends_with("Index.md"));
        assert_eq!(names(&listing.documents), vec!["README.md", "guide.md"]);
    }

    #[test]
    fn test_readme_is_promoted_without_index() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("readme.md"), "x").unwrap();

        let extensions = extensions();
        let scanner = Scanner::new(temp.path(), &extensions, &[]);
        let listing = scanner.list(temp.path()).unwrap();

        assert!(listing.index.unwrap().ends_with("readme.md"));
        assert!(listing.documents.is_empty());
    }

    #[test]
    fn test_ignore_by_name_or_relative_path() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("drafts")).unwrap();
        fs::create_dir_all(temp.path().join("api/internal")).unwrap();
        fs::write(temp.path().join("draft.md"), "x").unwrap();

        let extensions = extensions();
        let ignore = vec!["drafts".to_owned(), "/api/internal/".to_owned(), "draft.md".to_owned()];
        let scanner = Scanner::new(temp.path(), &extensions, &ignore);

        let root = scanner.list(temp.path()).unwrap();
        assert_eq!(names(&root.directories), vec!["api"]);
        assert!(root.documents.is_empty());

        let api = scanner.list(&temp.path().join("api")).unwrap();
        assert!(api.directories.is_empty());
    }

    #[test]
    fn test_relative_uses_forward_slashes() {
        let root = Path::new("/docs");
        let scanner = Scanner::new(root, &[], &[]);
        assert_eq!(scanner.relative(Path::new("/docs/api/users.md")), "api/users.md");
    }
}
