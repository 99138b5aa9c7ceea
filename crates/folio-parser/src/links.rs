//! Asset and reference extraction.
//!
//! Runs a `pulldown-cmark` event pass over the document body. Image tags
//! become [`Asset`]s and link tags become [`Reference`]s, so an image is
//! never mistaken for a link regardless of where it appears in the input.

use std::sync::LazyLock;

use folio_core::{Asset, AssetKind, Reference, ReferenceKind};
use pulldown_cmark::{Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;

static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("invalid scheme regex"));

/// True if the target leaves the site (URI scheme or protocol-relative).
#[must_use]
pub fn is_external(target: &str) -> bool {
    target.starts_with("//") || URI_SCHEME.is_match(target)
}

/// Guess asset kind and MIME type from a path or URL extension.
#[must_use]
pub fn guess_media(path: &str) -> (AssetKind, Option<&'static str>) {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => (AssetKind::Image, Some("image/png")),
        "jpg" | "jpeg" => (AssetKind::Image, Some("image/jpeg")),
        "gif" => (AssetKind::Image, Some("image/gif")),
        "svg" => (AssetKind::Image, Some("image/svg+xml")),
        "webp" => (AssetKind::Image, Some("image/webp")),
        "avif" => (AssetKind::Image, Some("image/avif")),
        "ico" => (AssetKind::Image, Some("image/x-icon")),
        "mp4" => (AssetKind::Video, Some("video/mp4")),
        "webm" => (AssetKind::Video, Some("video/webm")),
        "mov" => (AssetKind::Video, Some("video/quicktime")),
        "mp3" => (AssetKind::Audio, Some("audio/mpeg")),
        "wav" => (AssetKind::Audio, Some("audio/wav")),
        "ogg" => (AssetKind::Audio, Some("audio/ogg")),
        "pdf" => (AssetKind::Document, Some("application/pdf")),
        "txt" => (AssetKind::Document, Some("text/plain")),
        "csv" => (AssetKind::Document, Some("text/csv")),
        // Image syntax without a recognizable extension still embeds media.
        _ => (AssetKind::Image, None),
    }
}

struct Pending {
    target: String,
    text: String,
    is_image: bool,
    email: bool,
}

/// Extract assets and references from Markdown text.
///
/// `source` is recorded as the origin document of each reference.
pub(crate) fn extract(markdown: &str, source: &str) -> (Vec<Asset>, Vec<Reference>) {
    let mut assets = Vec::new();
    let mut references = Vec::new();
    let mut stack: Vec<Pending> = Vec::new();

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Image { dest_url, .. }) => stack.push(Pending {
                target: dest_url.to_string(),
                text: String::new(),
                is_image: true,
                email: false,
            }),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                ..
            }) => stack.push(Pending {
                target: dest_url.to_string(),
                text: String::new(),
                is_image: false,
                email: link_type == LinkType::Email,
            }),
            Event::Text(text) | Event::Code(text) => {
                if let Some(pending) = stack.last_mut() {
                    pending.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Image | TagEnd::Link) => {
                let Some(pending) = stack.pop() else {
                    continue;
                };
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&pending.text);
                }
                if pending.is_image {
                    let (kind, mime_type) = guess_media(&pending.target);
                    assets.push(Asset {
                        path: pending.target,
                        kind,
                        description: pending.text,
                        size: None,
                        mime_type: mime_type.map(str::to_owned),
                    });
                } else {
                    let kind = if pending.email || is_external(&pending.target) {
                        ReferenceKind::External
                    } else {
                        ReferenceKind::Internal
                    };
                    references.push(Reference {
                        kind,
                        source: source.to_owned(),
                        target: pending.target,
                        text: pending.text,
                    });
                }
            }
            _ => {}
        }
    }

    (assets, references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_at_start_is_not_a_reference() {
        let (assets, refs) = extract("![Logo](img/logo.png) and [Guide](guide.md)", "index.md");

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].path, "img/logo.png");
        assert_eq!(assets[0].description, "Logo");
        assert_eq!(assets[0].kind, AssetKind::Image);
        assert_eq!(assets[0].mime_type.as_deref(), Some("image/png"));

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "guide.md");
        assert_eq!(refs[0].text, "Guide");
        assert_eq!(refs[0].kind, ReferenceKind::Internal);
        assert_eq!(refs[0].source, "index.md");
    }

    #[test]
    fn test_external_classification() {
        let md = "[a](https://x.io) [b](//cdn.x.io/y) [c](../c.md) [d](#top) <me@x.io> [e](mailto:me@x.io)";
        let (_, refs) = extract(md, "");
        let kinds: Vec<_> = refs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ReferenceKind::External,
                ReferenceKind::External,
                ReferenceKind::Internal,
                ReferenceKind::Internal,
                ReferenceKind::External,
                ReferenceKind::External,
            ]
        );
    }

    #[test]
    fn test_linked_image_yields_both() {
        let (assets, refs) = extract("[![Badge](badge.svg)](https://ci.example.com)", "");
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].mime_type.as_deref(), Some("image/svg+xml"));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].text, "Badge");
        assert_eq!(refs[0].kind, ReferenceKind::External);
    }

    #[test]
    fn test_links_in_code_are_ignored() {
        let (assets, refs) = extract("```\n[not](a.md) ![no](b.png)\n```\n`[x](y)`", "");
        assert!(assets.is_empty());
        assert!(refs.is_empty());
    }

    #[test]
    fn test_guess_media() {
        assert_eq!(guess_media("clip.MP4?v=2").0, AssetKind::Video);
        assert_eq!(guess_media("spec.pdf").1, Some("application/pdf"));
        assert_eq!(guess_media("https://x.io/render"), (AssetKind::Image, None));
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.com"));
        assert!(is_external("//cdn.example.com/x.js"));
        assert!(!is_external("/docs/guide"));
        assert!(!is_external("guide.md"));
    }
}
