//! Markdown parser.
//!
//! Splits the document into a section tree by scanning for ATX headings of
//! level 1 to 3. Deeper headings and everything else stay in the body text
//! of the enclosing section. Lines inside fenced code blocks are never
//! headings.

use std::collections::HashMap;

use folio_core::{ContentNode, Metadata, ParsedContent};
use serde_json::Value;

use crate::frontmatter::{self, FrontMatterError};
use crate::links;
use crate::parser::{ParseOptions, Parser};
use crate::{ParseError, ParseErrorKind};

const FORMAT: &str = "markdown";
const MAX_SECTION_LEVEL: u8 = 3;
const UNTITLED: &str = "Untitled";

/// Markdown parser with YAML front matter support.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Parser for MarkdownParser {
    fn format(&self) -> &str {
        FORMAT
    }

    fn parse(&self, source: &str, options: &ParseOptions) -> Result<ParsedContent, ParseError> {
        let (mut metadata, body) = frontmatter::split(source)
            .map_err(|e| front_matter_error(e).with_optional_path(options.path()))?;

        let outline = build_outline(body);

        let title = outline
            .first_h1
            .clone()
            .or_else(|| string_field(&metadata, "title"))
            .unwrap_or_else(|| UNTITLED.to_owned());

        let description = string_field(&metadata, "description").or_else(|| outline.preamble.clone());
        if let Some(preamble) = &outline.preamble {
            metadata.insert("preamble".to_owned(), Value::String(preamble.clone()));
        }
        if options.path.is_some() {
            metadata.insert("originalPath".to_owned(), Value::String(options.source_name()));
        }

        let (assets, references) = links::extract(body, &options.source_name());

        Ok(ParsedContent {
            title,
            description,
            metadata,
            sections: outline.sections,
            assets,
            references,
        })
    }
}

fn front_matter_error(err: FrontMatterError) -> ParseError {
    let message = err.to_string();
    match err {
        FrontMatterError::Yaml(source) => ParseError::malformed(FORMAT, message).with_source(source),
        FrontMatterError::Unterminated | FrontMatterError::NotMapping(_) => {
            ParseError::new(ParseErrorKind::Malformed, FORMAT, message)
        }
    }
}

fn string_field(metadata: &Metadata, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Title of a Markdown document without building the section tree.
///
/// First H1, else front matter `title`. Malformed front matter is ignored.
#[must_use]
pub fn extract_title(source: &str) -> Option<String> {
    let (metadata, body) = frontmatter::split(source).unwrap_or_else(|_| (Metadata::new(), source));
    let mut fence = FenceTracker::default();
    for line in body.lines() {
        if fence.is_code(line) {
            continue;
        }
        if let Some((1, text)) = parse_heading(line) {
            return Some(text.to_owned());
        }
    }
    string_field(&metadata, "title")
}

struct Outline {
    sections: Vec<ContentNode>,
    first_h1: Option<String>,
    preamble: Option<String>,
}

fn build_outline(body: &str) -> Outline {
    let mut builder = SectionBuilder::default();
    let mut fence = FenceTracker::default();
    let mut first_h1 = None;

    for line in body.lines() {
        if !fence.is_code(line)
            && let Some((level, text)) = parse_heading(line)
        {
            if level == 1 && first_h1.is_none() {
                first_h1 = Some(text.to_owned());
            }
            builder.open(level, text);
            continue;
        }
        builder.push_line(line);
    }

    let (sections, preamble) = builder.finish();
    Outline {
        sections,
        first_h1,
        preamble,
    }
}

/// Parse an ATX heading of level 1 to 3.
///
/// Allows up to three spaces of indentation and strips an optional closing
/// sequence of `#` characters.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let hashes = rest.len() - rest.trim_start_matches('#').len();
    if hashes == 0 || hashes > usize::from(MAX_SECTION_LEVEL) {
        return None;
    }
    let after = &rest[hashes..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }

    let mut text = after.trim();
    let without_closing = text.trim_end_matches('#');
    if without_closing.is_empty() || without_closing.ends_with([' ', '\t']) {
        text = without_closing.trim_end();
    }

    let level = u8::try_from(hashes).ok()?;
    Some((level, text))
}

/// Tracks whether the scanner is inside a fenced code block.
#[derive(Default)]
struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Returns true if the line belongs to a code block (fences included).
    fn is_code(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let fence = ['`', '~'].into_iter().find_map(|c| {
            let len = trimmed.len() - trimmed.trim_start_matches(c).len();
            (len >= 3).then_some((c, len))
        });

        match (self.open, fence) {
            (None, Some(opening)) => {
                self.open = Some(opening);
                true
            }
            (Some((c, len)), Some((fc, flen)))
                if c == fc && flen >= len && trimmed[flen..].trim().is_empty() =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}

struct OpenSection {
    node: ContentNode,
    level: u8,
    body: Vec<String>,
}

/// Explicit stack of open sections.
#[derive(Default)]
struct SectionBuilder {
    stack: Vec<OpenSection>,
    roots: Vec<ContentNode>,
    preamble: Vec<String>,
    ids: HashMap<String, usize>,
}

impl SectionBuilder {
    fn push_line(&mut self, line: &str) {
        match self.stack.last_mut() {
            Some(open) => open.body.push(line.to_owned()),
            None => self.preamble.push(line.to_owned()),
        }
    }

    /// Close every open section of level >= `level`, then open a new one
    /// under the nearest remaining ancestor.
    fn open(&mut self, level: u8, title: &str) {
        while self.stack.last().is_some_and(|open| open.level >= level) {
            self.close_top();
        }
        let id = self.generate_id(title);
        self.stack.push(OpenSection {
            node: ContentNode::section(title, level).with_attribute("id", id),
            level,
            body: Vec::new(),
        });
    }

    fn close_top(&mut self) {
        let Some(OpenSection { mut node, body, .. }) = self.stack.pop() else {
            return;
        };
        node = node.with_text(trim_blank_lines(&body));
        match self.stack.last_mut() {
            Some(parent) => parent.node.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn finish(mut self) -> (Vec<ContentNode>, Option<String>) {
        while !self.stack.is_empty() {
            self.close_top();
        }
        let preamble = trim_blank_lines(&self.preamble);
        let preamble = (!preamble.is_empty()).then_some(preamble);
        (self.roots, preamble)
    }

    /// Unique slug for a heading; duplicates get `-1`, `-2`... suffixes.
    fn generate_id(&mut self, text: &str) -> String {
        let mut base_id = slugify(text);
        if base_id.is_empty() {
            base_id = "section".to_owned();
        }
        let count = self.ids.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Join lines, dropping leading and trailing blank lines.
fn trim_blank_lines(lines: &[String]) -> String {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

/// Convert heading text to a URL-safe anchor.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::AssetKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(source: &str) -> ParsedContent {
        MarkdownParser.parse(source, &ParseOptions::default()).unwrap()
    }

    fn titles(nodes: &[ContentNode]) -> Vec<&str> {
        nodes.iter().filter_map(|n| n.title.as_deref()).collect()
    }

    #[test]
    fn test_top_level_headings_become_level_one_nodes() {
        let doc = parse("# One\n\na\n\n# Two\n\nb\n\n# Three\n");

        assert_eq!(titles(&doc.sections), vec!["One", "Two", "Three"]);
        assert!(doc.sections.iter().all(|n| n.level == Some(1)));
        assert_eq!(doc.sections[0].text(), Some("a"));
        assert_eq!(doc.sections[2].text(), Some(""));
    }

    #[test]
    fn test_nesting() {
        let doc = parse("# Guide\nintro\n## Install\nsteps\n### Linux\napt\n## Usage\nrun\n# Next\n");

        assert_eq!(titles(&doc.sections), vec!["Guide", "Next"]);
        let guide = &doc.sections[0];
        assert_eq!(guide.text(), Some("intro"));
        assert_eq!(titles(&guide.children), vec!["Install", "Usage"]);
        assert_eq!(titles(&guide.children[0].children), vec!["Linux"]);
        assert_eq!(guide.children[0].children[0].level, Some(3));
        assert_eq!(guide.children[0].children[0].text(), Some("apt"));
    }

    #[test]
    fn test_skipped_level_attaches_to_nearest_ancestor() {
        let doc = parse("# Top\n### Deep\nx\n## Mid\n");

        let top = &doc.sections[0];
        assert_eq!(titles(&top.children), vec!["Deep", "Mid"]);
        assert_eq!(top.children[0].level, Some(3));
        assert_eq!(top.children[1].level, Some(2));
    }

    #[test]
    fn test_leading_subheading_is_top_level() {
        let doc = parse("## Only\ntext\n");
        assert_eq!(titles(&doc.sections), vec!["Only"]);
        assert_eq!(doc.sections[0].level, Some(2));
        assert_eq!(doc.title, "Untitled");
    }

    #[test]
    fn test_deeper_headings_stay_in_body() {
        let doc = parse("# A\n#### Four\nbody\n");
        assert!(doc.sections[0].children.is_empty());
        assert_eq!(doc.sections[0].text(), Some("#### Four\nbody"));
    }

    #[test]
    fn test_fenced_code_is_not_split() {
        let doc = parse("# A\n```bash\n# not a heading\n```\n~~~\n## nor this\n~~~\n## B\n");

        assert_eq!(doc.sections.len(), 1);
        assert_eq!(titles(&doc.sections[0].children), vec!["B"]);
        assert_eq!(
            doc.sections[0].text(),
            Some("```bash\n# not a heading\n```\n~~~\n## nor this\n~~~")
        );
    }

    #[test]
    fn test_heading_syntax() {
        assert_eq!(parse_heading("# Title"), Some((1, "Title")));
        assert_eq!(parse_heading("## Title ##"), Some((2, "Title")));
        assert_eq!(parse_heading("   ### C# tips"), Some((3, "C# tips")));
        assert_eq!(parse_heading("#"), Some((1, "")));
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("    # indented code"), None);
        assert_eq!(parse_heading("#### Four"), None);
    }

    #[test]
    fn test_title_resolution() {
        assert_eq!(parse("---\ntitle: Meta\n---\n# Heading\n").title, "Heading");
        assert_eq!(parse("---\ntitle: Meta\n---\n## Sub\n").title, "Meta");
        assert_eq!(parse("plain text").title, "Untitled");
    }

    #[test]
    fn test_front_matter_in_metadata() {
        let doc = parse("---\ntitle: Guide\ndescription: How to\norder: 3\n---\n# Guide\n");
        assert_eq!(doc.metadata["order"], json!(3));
        assert_eq!(doc.description.as_deref(), Some("How to"));
        assert!(!doc.metadata.contains_key("originalPath"));
    }

    #[test]
    fn test_preamble_is_description_fallback() {
        let doc = parse("\nWelcome to the docs.\n\n# Start\n");
        assert_eq!(doc.description.as_deref(), Some("Welcome to the docs."));
        assert_eq!(doc.metadata["preamble"], json!("Welcome to the docs."));
    }

    #[test]
    fn test_original_path_and_reference_source() {
        let options = ParseOptions::default().with_path("docs/guide.md");
        let doc = MarkdownParser.parse("# G\n[Home](index.md)\n", &options).unwrap();

        assert_eq!(doc.metadata["originalPath"], json!("docs/guide.md"));
        assert_eq!(doc.references[0].source, "docs/guide.md");
    }

    #[test]
    fn test_assets_and_references() {
        let doc = parse("![Diagram](arch.svg) see [API](https://api.example.com)\n");
        assert_eq!(doc.assets.len(), 1);
        assert_eq!(doc.assets[0].kind, AssetKind::Image);
        assert_eq!(doc.references.len(), 1);
    }

    #[test]
    fn test_unique_section_ids() {
        let doc = parse("# Setup\n## Notes\n# Usage\n## Notes\n# !!!\n");

        let mut ids = Vec::new();
        doc.walk(|node| ids.push(node.attributes["id"].clone()));
        assert_eq!(
            ids,
            vec![
                json!("setup"),
                json!("notes"),
                json!("usage"),
                json!("notes-1"),
                json!("section")
            ]
        );
    }

    #[test]
    fn test_malformed_front_matter_is_error() {
        let options = ParseOptions::default().with_path("bad.md");
        let err = MarkdownParser.parse("---\ntitle: [x\n---\n", &options).unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::Malformed);
        assert_eq!(err.format, "markdown");
        assert_eq!(err.path.as_deref(), Some(std::path::Path::new("bad.md")));
    }

    #[test]
    fn test_unterminated_front_matter_is_error() {
        let err = MarkdownParser
            .parse("---\ntitle: x\n# Heading\n", &ParseOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("not terminated"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let source = "---\ntitle: T\n---\nIntro\n# A\n![i](a.png)\n## B\n[l](b.md)\n";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = parse("# A\r\nline\r\n## B\r\n");
        assert_eq!(doc.sections[0].text(), Some("line"));
        assert_eq!(titles(&doc.sections[0].children), vec!["B"]);
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title("```\n# Code\n```\n# Real\n"), Some("Real".to_owned()));
        assert_eq!(extract_title("---\ntitle: Meta\n---\ntext"), Some("Meta".to_owned()));
        assert_eq!(extract_title("## Sub"), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  API -- Reference_v2 "), "api-reference-v2");
        assert_eq!(slugify("C++ & Rust!"), "c-rust");
    }
}
