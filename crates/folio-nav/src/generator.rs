//! Navigation tree derivation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use folio_core::{FileSystemError, FsOperation, NavigationItem};
use folio_parser::is_external;

use crate::options::NavigationOptions;
use crate::scanner::{Listing, Scanner};
use crate::url::{path_to_url, prettify_name};

/// Derives a [`NavigationItem`] tree from a source directory.
///
/// Every call rescans the filesystem; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct NavigationGenerator {
    root: PathBuf,
    options: NavigationOptions,
}

impl NavigationGenerator {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, options: NavigationOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    /// Build the navigation tree.
    ///
    /// Order within a directory: index entry, documents by file name, then
    /// subdirectories by name (or everything by title with `sort_by_title`).
    /// Configured links follow the scanned top-level items.
    ///
    /// # Errors
    ///
    /// Fails only if the root cannot be listed. Unreadable subdirectories
    /// are logged and skipped.
    pub fn generate(&self) -> Result<Vec<NavigationItem>, FileSystemError> {
        let scanner = Scanner::new(&self.root, &self.options.extensions, &self.options.ignore);
        let listing = scanner
            .list(&self.root)
            .map_err(|e| FileSystemError::new(FsOperation::ReadDir, &self.root, e))?;

        let mut items = Vec::new();
        if self.options.include_index
            && let Some(index) = &listing.index
        {
            items.push(self.page_item(index, url_for(&scanner, index)));
        }
        items.extend(self.entries(&scanner, &listing, 1));
        if self.options.sort_by_title {
            sort_by_title(&mut items);
        }

        items.extend(self.options.links.iter().map(|link| {
            NavigationItem::link(&link.title, &link.url, is_external(&link.url))
        }));

        tracing::debug!(
            root = %self.root.display(),
            items = items.len(),
            "generated navigation"
        );
        Ok(items)
    }

    /// Documents then subdirectory sections of one listing, at `depth`.
    ///
    /// Documents that differ only by extension share a URL; the first in
    /// name order is kept.
    fn entries(&self, scanner: &Scanner<'_>, listing: &Listing, depth: usize) -> Vec<NavigationItem> {
        let mut urls: HashSet<String> = listing
            .index
            .iter()
            .map(|index| url_for(scanner, index))
            .collect();
        let mut items = Vec::with_capacity(listing.documents.len() + listing.directories.len());
        for path in &listing.documents {
            let url = url_for(scanner, path);
            if !urls.insert(url.clone()) {
                tracing::warn!(
                    path = %path.display(),
                    url = %url,
                    "skipping document with duplicate URL"
                );
                continue;
            }
            items.push(self.page_item(path, url));
        }
        items.extend(
            listing
                .directories
                .iter()
                .filter_map(|dir| self.section_item(scanner, dir, depth)),
        );
        items
    }

    fn section_item(&self, scanner: &Scanner<'_>, dir: &Path, depth: usize) -> Option<NavigationItem> {
        let listing = match scanner.list(dir) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
                return None;
            }
        };

        let dir_title = || {
            dir.file_name()
                .map(|n| prettify_name(&n.to_string_lossy()))
                .unwrap_or_default()
        };
        let (title, path) = match listing.index.as_ref().filter(|_| self.options.include_index) {
            Some(index) => (
                self.document_title(index).unwrap_or_else(dir_title),
                Some(url_for(scanner, index)),
            ),
            None => (dir_title(), None),
        };

        let at_cutoff = self.options.max_depth.is_some_and(|max| depth >= max);
        let children = if at_cutoff {
            Vec::new()
        } else {
            let mut children = self.entries(scanner, &listing, depth + 1);
            if self.options.sort_by_title {
                sort_by_title(&mut children);
            }
            children
        };

        if path.is_none() && children.is_empty() {
            return None;
        }
        let mut section = NavigationItem::section(title, path);
        if !children.is_empty() {
            section.children = Some(children);
        }
        Some(section)
    }

    fn page_item(&self, path: &Path, url: String) -> NavigationItem {
        let title = self.document_title(path).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| prettify_name(&s.to_string_lossy()))
                .unwrap_or_default()
        });
        NavigationItem::page(title, url)
    }

    /// First H1, front-matter title or OpenAPI `info.title`.
    fn document_title(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        match fs::read_to_string(path) {
            Ok(source) => folio_parser::document_title(&source, ext),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read document title");
                None
            }
        }
    }
}

/// Site URL of a document, with its own extension removed first.
fn url_for(scanner: &Scanner<'_>, path: &Path) -> String {
    path_to_url(Some(&scanner.relative(&path.with_extension(""))))
}

fn sort_by_title(items: &mut [NavigationItem]) {
    items.sort_by_cached_key(|item| item.title.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::NavLink;
    use folio_core::NavItemType;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(temp: &TempDir, rel: &str, content: &str) {
        let path = temp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn titles(items: &[NavigationItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    fn site() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "index.md", "# Home\n");
        write(
            &temp,
            "getting-started.md",
            "# Getting Started\n\n## Install\n\n## Configure\n",
        );
        write(&temp, "api/index.md", "# API Reference\n");
        write(
            &temp,
            "api/users.md",
            "# Users API\n\n## GET /users\n\n## POST /users\n",
        );
        temp
    }

    #[test]
    fn test_generate_site() {
        let temp = site();
        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();

        assert_eq!(titles(&items), vec!["Home", "Getting Started", "API Reference"]);
        assert_eq!(items[0].path.as_deref(), Some("/"));
        assert_eq!(items[0].item_type, NavItemType::Page);
        assert_eq!(items[1].path.as_deref(), Some("/getting-started"));
        assert!(items[1].children.is_none());

        let api = &items[2];
        assert_eq!(api.item_type, NavItemType::Section);
        assert_eq!(api.path.as_deref(), Some("/api/"));
        assert_eq!(titles(api.child_items()), vec!["Users API"]);
        assert_eq!(api.child_items()[0].path.as_deref(), Some("/api/users"));
    }

    #[test]
    fn test_empty_subtrees_are_pruned() {
        let temp = site();
        fs::create_dir_all(temp.path().join("empty/nested/deeper")).unwrap();
        write(&temp, "assets/logo.png", "png");

        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Home", "Getting Started", "API Reference"]);
    }

    #[test]
    fn test_directory_without_index_becomes_pathless_section() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "user_guides/setup.md", "# Setup\n");

        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "User Guides");
        assert_eq!(items[0].path, None);
        assert_eq!(titles(items[0].child_items()), vec!["Setup"]);
    }

    #[test]
    fn test_index_only_directory_counts_as_non_empty() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "about/index.md", "no heading here\n");

        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "About");
        assert_eq!(items[0].path.as_deref(), Some("/about/"));
        assert!(items[0].children.is_none());
    }

    #[test]
    fn test_max_depth_one_has_no_children() {
        let temp = site();
        write(&temp, "api/v2/index.md", "# V2\n");
        let options = NavigationOptions {
            max_depth: Some(1),
            ..NavigationOptions::default()
        };

        let items = NavigationGenerator::new(temp.path(), options)
            .generate()
            .unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.children.is_none()));
    }

    #[test]
    fn test_max_depth_two_cuts_grandchildren() {
        let temp = site();
        write(&temp, "api/v2/index.md", "# V2\n");
        write(&temp, "api/v2/pets.md", "# Pets\n");
        let options = NavigationOptions {
            max_depth: Some(2),
            ..NavigationOptions::default()
        };

        let items = NavigationGenerator::new(temp.path(), options)
            .generate()
            .unwrap();
        let api = &items[2];
        assert_eq!(titles(api.child_items()), vec!["Users API", "V2"]);
        assert!(api.child_items()[1].children.is_none());
    }

    #[test]
    fn test_include_index_false() {
        let temp = site();
        let options = NavigationOptions {
            include_index: false,
            ..NavigationOptions::default()
        };

        let items = NavigationGenerator::new(temp.path(), options)
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Getting Started", "Api"]);
        assert_eq!(items[1].path, None);
        assert_eq!(titles(items[1].child_items()), vec!["Users API"]);
    }

    #[test]
    fn test_readme_represents_directory_and_loses_to_index() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "guide/README.md", "# Guide\n");
        write(&temp, "guide/intro.md", "# Intro\n");
        write(&temp, "both/index.md", "# Both\n");
        write(&temp, "both/readme.md", "# Read Me\n");

        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Both", "Guide"]);
        assert_eq!(items[0].path.as_deref(), Some("/both/"));
        assert_eq!(titles(items[0].child_items()), vec!["Read Me"]);
        assert_eq!(items[1].path.as_deref(), Some("/guide/README"));
        assert_eq!(titles(items[1].child_items()), vec!["Intro"]);
    }

    #[test]
    fn test_same_stem_documents_keep_first() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "users.md", "# Users Guide\n");
        write(
            &temp,
            "users.yaml",
            "openapi: 3.0.0\ninfo:\n  title: Users API\n",
        );
        write(&temp, "index.md", "# Home\n");
        write(&temp, "index.yaml", "openapi: 3.0.0\ninfo:\n  title: Root API\n");

        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Home", "Users Guide"]);
        assert_eq!(items[1].path.as_deref(), Some("/users"));
    }

    #[test]
    fn test_sort_by_title() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "a.md", "# zebra\n");
        write(&temp, "b.md", "# Apple\n");
        write(&temp, "c/index.md", "# Mango\n");
        let options = NavigationOptions {
            sort_by_title: true,
            ..NavigationOptions::default()
        };

        let items = NavigationGenerator::new(temp.path(), options)
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Apple", "Mango", "zebra"]);
    }

    #[test]
    fn test_front_matter_and_openapi_titles() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp, "faq.md", "---\ntitle: Questions\n---\nBody\n");
        write(&temp, "petstore.yaml", "openapi: 3.0.0\ninfo:\n  title: Petstore\n");
        write(&temp, "release_notes.md", "no title\n");

        let items = NavigationGenerator::new(temp.path(), NavigationOptions::default())
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Questions", "Petstore", "Release Notes"]);
        assert_eq!(items[1].path.as_deref(), Some("/petstore"));
    }

    #[test]
    fn test_ignore_and_extensions() {
        let temp = site();
        write(&temp, "drafts/wip.md", "# WIP\n");
        write(&temp, "notes.txt", "text");
        let options = NavigationOptions {
            ignore: vec!["drafts".to_owned(), "getting-started.md".to_owned()],
            extensions: vec!["md".to_owned()],
            ..NavigationOptions::default()
        };

        let items = NavigationGenerator::new(temp.path(), options)
            .generate()
            .unwrap();
        assert_eq!(titles(&items), vec!["Home", "API Reference"]);
    }

    #[test]
    fn test_links_follow_scanned_items() {
        let temp = site();
        let options = NavigationOptions {
            links: vec![
                NavLink::new("GitHub", "https://github.com/acme/docs"),
                NavLink::new("Changelog", "/changelog"),
            ],
            ..NavigationOptions::default()
        };

        let items = NavigationGenerator::new(temp.path(), options)
            .generate()
            .unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[3].item_type, NavItemType::Link);
        assert_eq!(items[3].external, Some(true));
        assert_eq!(items[4].external, Some(false));
    }

    #[test]
    fn test_missing_root_is_filesystem_error() {
        let temp = tempfile::tempdir().unwrap();
        let generator =
            NavigationGenerator::new(temp.path().join("missing"), NavigationOptions::default());
        let err = generator.generate().unwrap_err();
        assert_eq!(err.operation, FsOperation::ReadDir);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_regenerate_reflects_filesystem_changes() {
        let temp = site();
        let generator = NavigationGenerator::new(temp.path(), NavigationOptions::default());
        assert_eq!(generator.generate().unwrap().len(), 3);

        write(&temp, "zz-new.md", "# New\n");
        let items = generator.generate().unwrap();
        assert_eq!(titles(&items), vec!["Home", "Getting Started", "New", "API Reference"]);
    }
}
