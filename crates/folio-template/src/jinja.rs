//! MiniJinja engine.

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

use folio_cache::{Cache, CacheStats, MemoryCache};
use minijinja::value::{Kwargs, Value};
use minijinja::{Environment, Error, ErrorKind, State};

use crate::html::escape_html;
use crate::styling::{ClassOptions, StylingConfig};
use crate::{TemplateEngine, TemplateError};

/// Keyword arguments consumed by `component(...)`; everything else becomes
/// an HTML attribute.
const COMPONENT_KWARGS: [&str; 8] = [
    "name", "variant", "size", "color", "state", "class", "content", "caller",
];

type CompiledCache = Arc<dyn Cache<Arc<Environment<'static>>>>;

/// Jinja2-dialect engine backed by `minijinja`.
///
/// Each template path gets its own environment holding the compiled
/// template (and anything it includes). Environments are cached by path.
pub struct JinjaEngine {
    root: PathBuf,
    styling: Arc<StylingConfig>,
    cache: CompiledCache,
}

impl JinjaEngine {
    /// Create an engine loading templates from `root` with an unbounded cache.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            styling: Arc::new(StylingConfig::default()),
            cache: Arc::new(MemoryCache::new()),
        }
    }

    /// Styling used by the `component` function.
    #[must_use]
    pub fn with_styling(mut self, styling: Arc<StylingConfig>) -> Self {
        self.styling = styling;
        self.cache.clear();
        self
    }

    /// Replace the compiled-template cache.
    #[must_use]
    pub fn with_cache(mut self, cache: CompiledCache) -> Self {
        self.cache = cache;
        self
    }

    fn environment(&self, template: &str) -> Result<Arc<Environment<'static>>, TemplateError> {
        if let Some(env) = self.cache.get(template) {
            return Ok(env);
        }

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(self.root.clone()));
        let styling = Arc::clone(&self.styling);
        env.add_function(
            "component",
            move |state: &State, node_type: String, kwargs: Kwargs| {
                render_component(&styling, state, &node_type, &kwargs)
            },
        );

        env.get_template(template)
            .map_err(|e| self.compile_error(template, &e))?;

        let env = Arc::new(env);
        self.cache.set(template, Arc::clone(&env));
        tracing::debug!(engine = "jinja", template, "compiled template");
        Ok(env)
    }

    fn compile_error(&self, template: &str, err: &Error) -> TemplateError {
        let path = self.root.join(template);
        if err.kind() == ErrorKind::TemplateNotFound {
            TemplateError::NotFound { path }
        } else {
            TemplateError::Compile {
                path,
                message: format!("{err:#}"),
            }
        }
    }
}

impl TemplateEngine for JinjaEngine {
    fn name(&self) -> &str {
        "jinja"
    }

    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, TemplateError> {
        let env = self.environment(template)?;
        let render_error = |err: Error| TemplateError::Render {
            path: self.root.join(template),
            message: format!("{err:#}"),
        };
        env.get_template(template)
            .map_err(render_error)?
            .render(data)
            .map_err(render_error)
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for JinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaEngine")
            .field("root", &self.root)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

/// `component(type, name=, variant=, size=, color=, state=, class=, content=, **attrs)`
///
/// Body is `content` when given, else the `{% call %}` block body.
fn render_component(
    styling: &StylingConfig,
    state: &State,
    node_type: &str,
    kwargs: &Kwargs,
) -> Result<Value, Error> {
    let name: Option<String> = kwargs.get("name")?;
    let variant: Option<String> = kwargs.get("variant")?;
    let size: Option<String> = kwargs.get("size")?;
    let color: Option<String> = kwargs.get("color")?;
    let component_state: Option<String> = kwargs.get("state")?;
    let class: Option<String> = kwargs.get("class")?;
    let content: Option<Value> = kwargs.get("content")?;
    let caller: Option<Value> = kwargs.get("caller")?;

    let mut attrs = Vec::new();
    for key in kwargs.args() {
        if COMPONENT_KWARGS.contains(&key) {
            continue;
        }
        let value: Value = kwargs.get(key)?;
        if !value.is_undefined() && !value.is_none() {
            attrs.push((key.replace('_', "-"), value.to_string()));
        }
    }

    let classes = styling.component_classes(
        node_type,
        &ClassOptions {
            variant: variant.as_deref(),
            size: size.as_deref(),
            color: color.as_deref(),
            state: component_state.as_deref(),
            class: class.as_deref(),
        },
    );

    let body = match (content, caller) {
        (Some(content), _) if content.is_safe() => content.to_string(),
        (Some(content), _) => escape_html(&content.to_string()),
        (None, Some(caller)) => caller.call(state, &[])?.to_string(),
        (None, None) => String::new(),
    };

    let mut html = format!(
        r#"<div class="{}" data-component="{}""#,
        escape_html(&classes),
        escape_html(node_type)
    );
    if let Some(name) = name {
        let _ = write!(html, r#" data-name="{}""#, escape_html(&name));
    }
    for (key, value) in attrs {
        let _ = write!(html, r#" {key}="{}""#, escape_html(&value));
    }
    html.push('>');
    html.push_str(&body);
    html.push_str("</div>");

    Ok(Value::from_safe_string(html))
}
