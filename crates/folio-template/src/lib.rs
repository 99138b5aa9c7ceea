//! Template engines for Folio.
//!
//! [`TemplateEngine`] renders a template reference (a path relative to the
//! templates root) with JSON data. Two dialects are provided:
//!
//! - [`JinjaEngine`]: Jinja2 dialect via `minijinja`, with the global
//!   `component(...)` function usable directly or as a `{% call %}` block
//! - [`TeraEngine`]: Tera dialect, with the `component_classes(type=...)`
//!   function
//!
//! Both compile each template once and keep it in a FIFO cache keyed by
//! template path.

mod html;
mod jinja;
mod styling;
mod tera_engine;

use std::path::PathBuf;

use folio_cache::CacheStats;
use folio_core::ParsedContent;
use serde_json::{Value, json};

pub use html::escape_html;
pub use jinja::JinjaEngine;
pub use styling::{
    COMPONENT_PLACEHOLDER, ClassOptions, PageStyling, StylingConfig, StylingError, TypeStyling,
};
pub use tera_engine::TeraEngine;

/// Template loading or rendering failure.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to compile template {}: {message}", path.display())]
    Compile { path: PathBuf, message: String },
    #[error("Failed to render template {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

impl TemplateError {
    /// Template path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound { path } | Self::Compile { path, .. } | Self::Render { path, .. } => {
                path
            }
        }
    }
}

/// Renders template references with JSON data.
pub trait TemplateEngine: Send + Sync {
    /// Engine name used in logs ("jinja", "tera").
    fn name(&self) -> &str;

    /// Render a template with arbitrary data.
    fn render(&self, template: &str, data: &Value) -> Result<String, TemplateError>;

    /// Render a whole parsed document.
    ///
    /// The template receives `content`, `stylingConfig`, `meta`, `title`,
    /// `description`, `sections`, `assets` and `references`.
    fn render_content(
        &self,
        content: &ParsedContent,
        template: &str,
        styling: Option<&StylingConfig>,
    ) -> Result<String, TemplateError> {
        self.render(template, &content_data(content, styling))
    }

    /// Drop every compiled template.
    fn clear_cache(&self);

    /// Compiled-template cache counters.
    fn cache_stats(&self) -> CacheStats;
}

/// Canonical data shape passed to document templates.
#[must_use]
pub fn content_data(content: &ParsedContent, styling: Option<&StylingConfig>) -> Value {
    json!({
        "content": content,
        "stylingConfig": styling,
        "meta": content.metadata,
        "title": content.title,
        "description": content.description,
        "sections": content.sections,
        "assets": content.assets,
        "references": content.references,
    })
}
