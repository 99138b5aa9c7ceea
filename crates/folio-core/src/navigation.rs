//! Navigation tree items.

use serde::{Deserialize, Serialize};

/// Kind of navigation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavItemType {
    /// A single document.
    Page,
    /// A directory, optionally backed by an index document.
    Section,
    /// A configured link that does not come from the source tree.
    Link,
}

/// Navigation item with optional children for UI trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    /// Display title.
    pub title: String,
    /// Link target. `None` only for sections without index content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub item_type: NavItemType,
    /// Child items; `None` when there are none or they were cut by depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavigationItem>>,
    /// Set for links that leave the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
}

impl NavigationItem {
    #[must_use]
    pub fn page(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: Some(path.into()),
            item_type: NavItemType::Page,
            children: None,
            external: None,
        }
    }

    #[must_use]
    pub fn section(title: impl Into<String>, path: Option<String>) -> Self {
        Self {
            title: title.into(),
            path,
            item_type: NavItemType::Section,
            children: None,
            external: None,
        }
    }

    #[must_use]
    pub fn link(title: impl Into<String>, url: impl Into<String>, external: bool) -> Self {
        Self {
            title: title.into(),
            path: Some(url.into()),
            item_type: NavItemType::Link,
            children: None,
            external: Some(external),
        }
    }

    /// Child items as a slice (empty when absent).
    #[must_use]
    pub fn child_items(&self) -> &[NavigationItem] {
        self.children.as_deref().unwrap_or_default()
    }

    /// True if this item or any descendant carries a path.
    #[must_use]
    pub fn has_path_in_subtree(&self) -> bool {
        self.path.is_some() || self.child_items().iter().any(Self::has_path_in_subtree)
    }
}
