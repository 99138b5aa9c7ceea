//! Navigation options.

/// Extra top-level link appended after the scanned items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

impl NavLink {
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Options controlling navigation derivation.
#[derive(Clone, Debug)]
pub struct NavigationOptions {
    /// Deepest level that may carry items; items at this depth get no
    /// children. Top-level items are depth 1. `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Keep index documents as the entries of their directories.
    pub include_index: bool,
    /// Sort siblings by title (case-insensitive) instead of scan order.
    pub sort_by_title: bool,
    /// File or directory names, or root-relative paths, to skip.
    pub ignore: Vec<String>,
    /// Document extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Links appended to the top level.
    pub links: Vec<NavLink>,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_index: true,
            sort_by_title: false,
            ignore: Vec::new(),
            extensions: ["md", "markdown", "yaml", "yml", "json"]
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
            links: Vec::new(),
        }
    }
}
