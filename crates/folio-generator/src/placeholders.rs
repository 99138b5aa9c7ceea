//! Class placeholder substitution.
//!
//! Templates write classes as placeholders (`class="{base} {variant:wide}"`)
//! that are resolved against the styling configuration after rendering.
//! Only `class` attribute values are touched, so literal braces in text
//! (`/users/{id}`) survive.

use std::sync::LazyLock;

use folio_template::StylingConfig;
use regex::{Captures, Regex};

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="([^"]*)""#).expect("invalid class attribute regex"));

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}\s]+)\}").expect("invalid placeholder regex"));

/// Replace `{key}` placeholders inside class attributes.
///
/// Only double-quoted `class="..."` values are rewritten. Braces anywhere
/// else (text, other attributes, single-quoted classes) pass through
/// unchanged. Unknown keys resolve to an empty string; surrounding
/// whitespace is normalized afterwards.
pub(crate) fn apply(markup: &str, styling: &StylingConfig, node_type: &str) -> String {
    CLASS_ATTR
        .replace_all(markup, |caps: &Captures<'_>| {
            let value = &caps[1];
            if !value.contains('{') {
                return caps[0].to_owned();
            }
            let resolved = PLACEHOLDER.replace_all(value, |inner: &Captures<'_>| {
                styling.class_for(node_type, &inner[1]).to_owned()
            });
            let normalized = resolved.split_whitespace().collect::<Vec<_>>().join(" ");
            format!(r#"class="{normalized}""#)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn styling() -> StylingConfig {
        StylingConfig::from_toml_str(
            "[types.section]\nclass_mapping = { base = \"prose\", \"variant:wide\" = \"max-w-none\" }\n",
        )
        .unwrap()
    }

    #[test]
    fn test_replaces_known_placeholders() {
        let out = apply(r#"<section class="{base} {variant:wide}">x</section>"#, &styling(), "section");
        assert_eq!(out, r#"<section class="prose max-w-none">x</section>"#);
    }

    #[test]
    fn test_unknown_placeholders_become_empty() {
        let out = apply(r#"<div class="{missing} keep {base}"></div>"#, &styling(), "section");
        assert_eq!(out, r#"<div class="keep prose"></div>"#);

        let out = apply(r#"<div class="{base}"></div>"#, &styling(), "table");
        assert_eq!(out, r#"<div class=""></div>"#);
    }

    #[test]
    fn test_text_outside_class_attributes_is_untouched() {
        let markup = r#"<h2 class="{base}">GET /users/{id}</h2>"#;
        let out = apply(markup, &styling(), "section");
        assert_eq!(out, r#"<h2 class="prose">GET /users/{id}</h2>"#);
    }

    #[test]
    fn test_other_attributes_keep_braces() {
        let markup = r#"<a class="{base}" href="/users/{id}" title="{base}" data-x='{base}'>x</a>"#;
        let out = apply(markup, &styling(), "section");
        assert_eq!(
            out,
            r#"<a class="prose" href="/users/{id}" title="{base}" data-x='{base}'>x</a>"#
        );
    }

    #[test]
    fn test_plain_class_attributes_are_unchanged() {
        let markup = r#"<p class="a  b">t</p>"#;
        assert_eq!(apply(markup, &styling(), "section"), markup);
    }
}
