//! Component and page generation.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use folio_core::{ContentNode, NodeContent, ParsedContent};
use folio_template::{StylingConfig, TemplateEngine, TemplateError, escape_html};
use serde_json::json;

use crate::placeholders;
use crate::registry::TemplateRegistry;

const DEFAULT_PAGE_TITLE: &str = "Generated Page";

/// Generation failure.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No template registered for element type '{0}'")]
    UnknownTemplateType(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Deferred renderer attached to a [`ComponentTemplate`].
pub type GenerateFn = Arc<dyn Fn(&ContentNode) -> Result<String, GenerateError> + Send + Sync>;

/// One unit of generation output handed to the build step.
#[derive(Clone)]
pub struct ComponentTemplate {
    pub name: String,
    /// Target emission path, relative to the output directory.
    pub path: String,
    /// Rendered markup, or the template reference for deferred components.
    pub content: String,
    /// Renders nodes of this component's type on demand.
    pub generate: Option<GenerateFn>,
}

impl ComponentTemplate {
    /// A fully rendered page.
    #[must_use]
    pub fn page(name: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
            generate: None,
        }
    }
}

impl std::fmt::Debug for ComponentTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentTemplate")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("content", &self.content)
            .field("generate", &self.generate.is_some())
            .finish()
    }
}

/// Walks a content tree and renders each node through its type's template.
///
/// Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct ComponentGenerator {
    engine: Arc<dyn TemplateEngine>,
    templates: Arc<TemplateRegistry>,
    styling: Arc<StylingConfig>,
}

impl ComponentGenerator {
    #[must_use]
    pub fn new(
        engine: Arc<dyn TemplateEngine>,
        templates: Arc<TemplateRegistry>,
        styling: Arc<StylingConfig>,
    ) -> Self {
        Self {
            engine,
            templates,
            styling,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    #[must_use]
    pub fn styling(&self) -> &StylingConfig {
        &self.styling
    }

    fn template_for(&self, node_type: &str) -> Result<&str, GenerateError> {
        self.templates
            .get(node_type)
            .ok_or_else(|| GenerateError::UnknownTemplateType(node_type.to_owned()))
    }

    /// Render one node and its subtree.
    ///
    /// Children (and nested content nodes) are rendered first and passed to
    /// the node's template as pre-rendered markup in `children` and
    /// `content`. Class placeholders are resolved afterwards.
    pub fn generate_component(&self, node: &ContentNode) -> Result<String, GenerateError> {
        let template = self.template_for(&node.node_type)?;

        let children = node
            .children
            .iter()
            .map(|child| self.generate_component(child))
            .collect::<Result<Vec<_>, _>>()?;
        let content = match &node.content {
            NodeContent::Text(text) => text.clone(),
            NodeContent::Nodes(nodes) => nodes
                .iter()
                .map(|n| self.generate_component(n))
                .collect::<Result<Vec<_>, _>>()?
                .join("\n"),
        };

        let data = json!({
            "node": node,
            "type": node.node_type,
            "title": node.title,
            "level": node.level,
            "content": content,
            "attributes": node.attributes,
            "children": children.join("\n"),
            "styling": self.styling.config_for_type(&node.node_type),
        });
        let rendered = self.engine.render(template, &data)?;

        Ok(placeholders::apply(&rendered, &self.styling, &node.node_type))
    }

    /// Assemble a page from every top-level node.
    ///
    /// Output: page imports verbatim, one import line per design-system
    /// component used, then a container `<div>` wrapping the node markup.
    pub fn generate_page(&self, parsed: &ParsedContent) -> Result<String, GenerateError> {
        let markups = parsed
            .sections
            .iter()
            .map(|node| self.generate_component(node))
            .collect::<Result<Vec<_>, _>>()?;

        let page = &self.styling.page;
        let mut imports: Vec<String> = page.imports.clone();
        let mut components: Vec<&str> = Vec::new();
        for node_type in parsed.node_types() {
            for component in self.styling.components_for(node_type) {
                if !components.contains(&component.as_str()) {
                    components.push(component);
                }
            }
        }
        imports.extend(components.iter().map(|c| page.import_line(c)));

        let mut out = String::new();
        if !imports.is_empty() {
            out.push_str(&imports.join("\n"));
            out.push_str("\n\n");
        }
        let _ = writeln!(
            out,
            r#"<div class="{}" data-page="{}">"#,
            escape_html(&page.container_class),
            page_symbol(&parsed.title)
        );
        for markup in &markups {
            out.push_str(markup);
            out.push('\n');
        }
        out.push_str("</div>\n");

        tracing::debug!(
            title = %parsed.title,
            nodes = markups.len(),
            components = components.len(),
            "generated page"
        );
        Ok(out)
    }

    /// One deferred component per distinct element type, in first-seen order.
    ///
    /// `content` holds the template reference; `generate` renders a node of
    /// that type later.
    pub fn component_templates(
        &self,
        parsed: &ParsedContent,
    ) -> Result<Vec<ComponentTemplate>, GenerateError> {
        parsed
            .node_types()
            .into_iter()
            .map(|node_type| {
                let template = self.template_for(node_type)?;
                let generator = self.clone();
                let generate: GenerateFn = Arc::new(move |node| generator.generate_component(node));
                Ok(ComponentTemplate {
                    name: component_name(node_type),
                    path: component_path(node_type, template),
                    content: template.to_owned(),
                    generate: Some(generate),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for ComponentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentGenerator")
            .field("engine", &self.engine.name())
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

/// Identifier-safe page symbol derived from a title.
///
/// Non-alphanumeric characters are dropped; a leading digit or an empty
/// result gets a `Page` prefix. Blank titles use "Generated Page".
#[must_use]
pub fn page_symbol(title: &str) -> String {
    let title = if title.trim().is_empty() {
        DEFAULT_PAGE_TITLE
    } else {
        title
    };
    let symbol: String = title.chars().filter(char::is_ascii_alphanumeric).collect();
    if symbol.is_empty() || symbol.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Page{symbol}")
    } else {
        symbol
    }
}

/// `api-operation` -> `ApiOperation`.
fn component_name(node_type: &str) -> String {
    let mut name = String::with_capacity(node_type.len());
    for word in node_type.split(['-', '_', ' ', '.']).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

fn component_path(node_type: &str, template: &str) -> String {
    match Path::new(template).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("components/{}.{ext}", component_name(node_type)),
        None => format!("components/{}", component_name(node_type)),
    }
}
