//! Built-in plugin catalog.
//!
//! | Name              | Hook          | Effect                                        |
//! |-------------------|---------------|-----------------------------------------------|
//! | `strip-comments`  | `beforeParse` | removes `<!-- ... -->` from the source        |
//! | `heading-anchors` | `afterParse`  | sets `attributes.anchor = "#<id>"` on sections |
//! | `reading-time`    | `afterParse`  | sets `metadata.readingTimeMinutes`            |

use std::path::Path;
use std::sync::{Arc, LazyLock};

use folio_core::{NodeContent, ParsedContent};
use folio_parser::{BoxError, Plugin};
use regex::Regex;
use serde_json::Value;

use crate::error::BuildError;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"));

const WORDS_PER_MINUTE: usize = 200;

/// Names accepted by [`load_plugins`].
pub const CATALOG: [&str; 3] = ["strip-comments", "heading-anchors", "reading-time"];

/// Instantiate catalog plugins by name, preserving order.
///
/// Unknown names are logged and skipped, or rejected when `strict`.
pub fn load_plugins(names: &[String], strict: bool) -> Result<Vec<Arc<dyn Plugin>>, BuildError> {
    let mut plugins: Vec<Arc<dyn Plugin>> = Vec::with_capacity(names.len());
    for name in names {
        let plugin: Arc<dyn Plugin> = match name.as_str() {
            "strip-comments" => Arc::new(StripComments),
            "heading-anchors" => Arc::new(HeadingAnchors),
            "reading-time" => Arc::new(ReadingTime),
            unknown if strict => return Err(BuildError::UnknownPlugin(unknown.to_owned())),
            unknown => {
                tracing::warn!(plugin = unknown, "skipping unknown plugin");
                continue;
            }
        };
        plugins.push(plugin);
    }
    Ok(plugins)
}

/// Removes HTML comments before parsing.
pub struct StripComments;

impl Plugin for StripComments {
    fn name(&self) -> &str {
        "strip-comments"
    }

    fn before_parse(&self, source: String, _path: Option<&Path>) -> Result<String, BoxError> {
        if !source.contains("<!--") {
            return Ok(source);
        }
        Ok(HTML_COMMENT.replace_all(&source, "").into_owned())
    }
}

/// Adds `attributes.anchor` to every node carrying an `id`.
pub struct HeadingAnchors;

impl Plugin for HeadingAnchors {
    fn name(&self) -> &str {
        "heading-anchors"
    }

    fn after_parse(
        &self,
        mut content: ParsedContent,
        _path: Option<&Path>,
    ) -> Result<ParsedContent, BoxError> {
        content.walk_mut(|node| {
            let anchor = match node.attributes.get("id") {
                Some(Value::String(id)) if !id.is_empty() => format!("#{id}"),
                _ => return,
            };
            node.attributes
                .insert("anchor".to_owned(), Value::String(anchor));
        });
        Ok(content)
    }
}

/// Estimates reading time at 200 words per minute, at least one minute.
pub struct ReadingTime;

impl Plugin for ReadingTime {
    fn name(&self) -> &str {
        "reading-time"
    }

    fn after_parse(
        &self,
        mut content: ParsedContent,
        _path: Option<&Path>,
    ) -> Result<ParsedContent, BoxError> {
        let mut words = content
            .description
            .as_deref()
            .map_or(0, |d| d.split_whitespace().count());
        content.walk(|node| {
            if let Some(title) = &node.title {
                words += title.split_whitespace().count();
            }
            if let NodeContent::Text(text) = &node.content {
                words += text.split_whitespace().count();
            }
        });
        let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
        content
            .metadata
            .insert("readingTimeMinutes".to_owned(), Value::from(minutes));
        Ok(content)
    }
}
