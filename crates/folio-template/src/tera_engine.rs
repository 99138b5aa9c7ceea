//! Tera engine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use folio_cache::{Cache, CacheStats, MemoryCache};
use regex::Regex;
use tera::{Context, Tera};

use crate::styling::{ClassOptions, StylingConfig};
use crate::{TemplateEngine, TemplateError};

type CompiledCache = Arc<dyn Cache<Arc<Tera>>>;

/// Names pulled in by `extends`, `include` and `import` tags.
static TEMPLATE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%-?\s*(?:extends|include|import)\s+["']([^"']+)["']"#)
        .expect("invalid template reference regex")
});

/// Tera-dialect engine.
///
/// Templates are read from the templates root and compiled into a
/// dedicated [`Tera`] instance per path, together with every template it
/// extends, includes or imports (transitively). Exposes
/// `component_classes(type=, variant=, size=, color=, state=, class=)`
/// returning the resolved class string.
pub struct TeraEngine {
    root: PathBuf,
    styling: Arc<StylingConfig>,
    cache: CompiledCache,
}

impl TeraEngine {
    /// Create an engine loading templates from `root` with an unbounded cache.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            styling: Arc::new(StylingConfig::default()),
            cache: Arc::new(MemoryCache::new()),
        }
    }

    /// Styling used by `component_classes`.
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

    fn compiled(&self, template: &str) -> Result<Arc<Tera>, TemplateError> {
        if let Some(tera) = self.cache.get(template) {
            return Ok(tera);
        }

        let sources = self.load_sources(template)?;

        let mut tera = Tera::default();
        let styling = Arc::clone(&self.styling);
        tera.register_function(
            "component_classes",
            move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                let arg = |key: &str| args.get(key).and_then(tera::Value::as_str);
                let node_type = arg("type")
                    .ok_or_else(|| tera::Error::msg("component_classes requires `type`"))?;
                let classes = styling.component_classes(
                    node_type,
                    &ClassOptions {
                        variant: arg("variant"),
                        size: arg("size"),
                        color: arg("color"),
                        state: arg("state"),
                        class: arg("class"),
                    },
                );
                Ok(tera::Value::String(classes))
            },
        );
        tera.add_raw_templates(sources)
            .map_err(|e| TemplateError::Compile {
                path: self.root.join(template),
                message: error_chain(&e),
            })?;

        let tera = Arc::new(tera);
        self.cache.set(template, Arc::clone(&tera));
        tracing::debug!(engine = "tera", template, "compiled template");
        Ok(tera)
    }

    /// `template` followed by the templates it references, breadth first.
    ///
    /// Missing references are left for Tera to report in context.
    fn load_sources(&self, template: &str) -> Result<Vec<(String, String)>, TemplateError> {
        let mut sources = vec![(template.to_owned(), self.read_source(template)?)];
        let mut next = 0;
        while next < sources.len() {
            let refs: Vec<String> = TEMPLATE_REF
                .captures_iter(&sources[next].1)
                .map(|c| c[1].to_owned())
                .collect();
            next += 1;
            for name in refs {
                if sources.iter().any(|(loaded, _)| *loaded == name) {
                    continue;
                }
                match self.read_source(&name) {
                    Ok(source) => sources.push((name, source)),
                    Err(TemplateError::NotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(sources)
    }

    fn read_source(&self, template: &str) -> Result<String, TemplateError> {
        let path = self.root.join(template);
        match std::fs::read_to_string(&path) {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound { path })
            }
            Err(e) => Err(TemplateError::Compile {
                path,
                message: e.to_string(),
            }),
        }
    }
}

/// Tera keeps the useful detail in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl TemplateEngine for TeraEngine {
    fn name(&self) -> &str {
        "tera"
    }

    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, TemplateError> {
        let tera = self.compiled(template)?;
        let render_error = |err: tera::Error| TemplateError::Render {
            path: self.root.join(template),
            message: error_chain(&err),
        };
        let context = Context::from_serialize(data).map_err(render_error)?;
        tera.render(template, &context).map_err(render_error)
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for TeraEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeraEngine")
            .field("root", &self.root)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}
