//! Parsed document and section tree types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open key/value mapping used for metadata and node attributes.
pub type Metadata = BTreeMap<String, Value>;

/// Body of a [`ContentNode`]: raw text or nested nodes, never both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeContent {
    /// Verbatim text.
    Text(String),
    /// Ordered nested nodes.
    Nodes(Vec<ContentNode>),
}

impl Default for NodeContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// A structural unit of a document (section, endpoint, schema...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Element type tag (e.g. "section", "api-operation").
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Node body.
    #[serde(default)]
    pub content: NodeContent,
    /// Heading depth (1-based) for section-like nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Child nodes in document order.
    #[serde(default)]
    pub children: Vec<ContentNode>,
    /// Type-specific fields (HTTP method, table rows, anchor id...).
    #[serde(default)]
    pub attributes: Metadata,
}

impl ContentNode {
    /// Create an empty node of the given type.
    #[must_use]
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            title: None,
            content: NodeContent::default(),
            level: None,
            children: Vec::new(),
            attributes: Metadata::new(),
        }
    }

    /// Create a `section` node with a title and heading level.
    #[must_use]
    pub fn section(title: impl Into<String>, level: u8) -> Self {
        Self::new("section").with_title(title).with_level(level)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = NodeContent::Text(text.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Text body, if the content is text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(text) => Some(text),
            NodeContent::Nodes(_) => None,
        }
    }

    /// Visit this node and all descendants in pre-order.
    ///
    /// Nested nodes held in `content` are visited before `children`.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ContentNode)) {
        visit(self);
        if let NodeContent::Nodes(nodes) = &self.content {
            for node in nodes {
                node.walk(visit);
            }
        }
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Visit this node and all descendants mutably in pre-order.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut ContentNode)) {
        visit(self);
        if let NodeContent::Nodes(nodes) = &mut self.content {
            for node in nodes {
                node.walk_mut(visit);
            }
        }
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

/// Media kind of an extracted asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

/// Media reference extracted from document text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Path or URL as written in the source.
    pub path: String,
    /// Guessed media kind.
    pub kind: AssetKind,
    /// Alternative text describing the asset.
    pub description: String,
    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type guessed from the extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Whether a link stays within the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Internal,
    External,
}

/// Link extracted from document text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Document the link was found in (empty when parsed from a string).
    pub source: String,
    /// Link target as written.
    pub target: String,
    /// Display text.
    pub text: String,
}

/// Canonical parser output for one source document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Front-matter or document-level metadata (`originalPath`, `version`, `examples`...).
    #[serde(default)]
    pub metadata: Metadata,
    /// Top-level nodes in document order.
    #[serde(default)]
    pub sections: Vec<ContentNode>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl ParsedContent {
    /// Create an empty document with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Visit every node of every section in pre-order.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a ContentNode)) {
        for section in &self.sections {
            section.walk(&mut visit);
        }
    }

    /// Visit every node of every section mutably in pre-order.
    pub fn walk_mut(&mut self, mut visit: impl FnMut(&mut ContentNode)) {
        for section in &mut self.sections {
            section.walk_mut(&mut visit);
        }
    }

    /// Distinct node types in first-seen pre-order.
    #[must_use]
    pub fn node_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        self.walk(|node| {
            if !types.contains(&node.node_type.as_str()) {
                types.push(&node.node_type);
            }
        });
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ParsedContent {
        let mut doc = ParsedContent::new("Doc");
        doc.sections.push(
            ContentNode::section("A", 1)
                .with_text("alpha")
                .with_child(ContentNode::section("A.1", 2))
                .with_child(ContentNode::new("table").with_attribute("rows", json!([]))),
        );
        doc.sections.push(ContentNode::section("B", 1));
        doc
    }

    #[test]
    fn test_walk_is_preorder() {
        let doc = sample();
        let mut titles = Vec::new();
        doc.walk(|node| titles.push(node.title.clone().unwrap_or_default()));
        assert_eq!(titles, vec!["A", "A.1", "", "B"]);
    }

    #[test]
    fn test_node_types_first_seen_order() {
        assert_eq!(sample().node_types(), vec!["section", "table"]);
    }

    #[test]
    fn test_walk_visits_nested_content_nodes() {
        let mut node = ContentNode::new("group");
        node.content = NodeContent::Nodes(vec![ContentNode::new("inner")]);
        let mut types = Vec::new();
        node.walk(&mut |n: &ContentNode| types.push(n.node_type.clone()));
        assert_eq!(types, vec!["group", "inner"]);
    }

    #[test]
    fn test_walk_mut_can_annotate() {
        let mut doc = sample();
        doc.walk_mut(|node| {
            node.attributes.insert("seen".to_owned(), json!(true));
        });
        assert_eq!(doc.sections[0].children[0].attributes["seen"], json!(true));
    }

    #[test]
    fn test_serializes_type_key_and_camel_case() {
        let mut doc = ParsedContent::new("Doc");
        doc.assets.push(Asset {
            path: "a.png".to_owned(),
            kind: AssetKind::Image,
            description: "A".to_owned(),
            size: None,
            mime_type: Some("image/png".to_owned()),
        });
        doc.sections.push(ContentNode::section("S", 1));
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["sections"][0]["type"], json!("section"));
        assert_eq!(value["sections"][0]["content"], json!(""));
        assert_eq!(value["assets"][0]["mimeType"], json!("image/png"));
        assert_eq!(value["assets"][0]["kind"], json!("image"));
    }

    #[test]
    fn test_text_accessor() {
        assert_eq!(ContentNode::new("p").with_text("hi").text(), Some("hi"));
        let mut node = ContentNode::new("p");
        node.content = NodeContent::Nodes(Vec::new());
        assert_eq!(node.text(), None);
    }
}
