//! Text serializations of a navigation tree.

use std::fmt::Write;

use folio_core::{NavItemType, NavigationItem};

use crate::url::path_to_url;

const INDENT: &str = "  ";

/// Full nested list, two spaces of indent per depth.
///
/// Items with a path render as `* [Title](url)`, path-less sections as
/// `* Title`.
#[must_use]
pub fn render_sidebar(items: &[NavigationItem]) -> String {
    let mut out = String::new();
    write_items(&mut out, items, 0, true);
    out
}

/// Top-level items only.
#[must_use]
pub fn render_navbar(items: &[NavigationItem]) -> String {
    let mut out = String::new();
    write_items(&mut out, items, 0, false);
    out
}

fn write_items(out: &mut String, items: &[NavigationItem], depth: usize, nested: bool) {
    for item in items {
        let indent = INDENT.repeat(depth);
        let _ = match &item.path {
            Some(path) => writeln!(out, "{indent}* [{}]({})", item.title, link(item, path)),
            None => writeln!(out, "{indent}* {}", item.title),
        };
        if nested {
            write_items(out, item.child_items(), depth + 1, true);
        }
    }
}

/// Configured links are emitted verbatim; everything else goes through
/// [`path_to_url`].
fn link(item: &NavigationItem, path: &str) -> String {
    if item.item_type == NavItemType::Link {
        path.to_owned()
    } else {
        path_to_url(Some(path))
    }
}
