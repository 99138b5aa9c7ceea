//! Batch build.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_cache::{Cache, CacheStats, MemoryCache, NullCache};
use folio_config::{Config, EngineKind};
use folio_core::{FileSystemError, NavigationItem, ParsedContent, relative_path};
use folio_generator::{ComponentGenerator, ComponentTemplate, TemplateRegistry, page_symbol};
use folio_nav::{NavLink, NavigationGenerator, NavigationOptions};
use folio_parser::{BoxError, ParseOptions, ParserRegistry};
use folio_template::{JinjaEngine, StylingConfig, TemplateEngine, TeraEngine};
use rayon::prelude::*;

use crate::discovery::discover;
use crate::error::{BuildError, DocumentError, DocumentFailure};
use crate::plugins::load_plugins;

/// Element types produced by the built-in parsers.
const BUILTIN_TYPES: [&str; 5] = [
    "section",
    "api-info",
    "api-path",
    "api-operation",
    "api-schema",
];

/// Extension of emitted page files.
const PAGE_EXTENSION: &str = "html";

/// Receives the generated templates of a build.
pub trait BuildSink {
    /// Emit templates, in discovery order, below `output_dir`.
    fn emit(&mut self, output_dir: &Path, templates: &[ComponentTemplate]) -> Result<(), BoxError>;
}

/// Result of a build that produced at least one page.
#[derive(Debug)]
pub struct BuildOutput {
    /// One page per successful document, in discovery order.
    pub templates: Vec<ComponentTemplate>,
    /// One deferred component per element type, first-seen order.
    pub components: Vec<ComponentTemplate>,
    pub navigation: Vec<NavigationItem>,
    /// Documents left out of the build.
    pub failures: Vec<DocumentFailure>,
    pub content_cache: CacheStats,
    pub template_cache: CacheStats,
}

/// Per-document output before merging.
struct Processed {
    page: ComponentTemplate,
    components: Vec<ComponentTemplate>,
}

/// Parses and generates every document of a source tree on a worker pool.
pub struct Pipeline {
    source_dir: PathBuf,
    output_dir: PathBuf,
    extensions: Vec<String>,
    ignore: Vec<String>,
    concurrency: usize,
    registry: ParserRegistry,
    generator: ComponentGenerator,
    navigation: NavigationGenerator,
}

impl Pipeline {
    /// Assemble a pipeline from parts.
    ///
    /// Navigation scans `source_dir` with the extensions and ignore list of
    /// `navigation`.
    #[must_use]
    pub fn new(
        registry: ParserRegistry,
        generator: ComponentGenerator,
        navigation: NavigationGenerator,
    ) -> Self {
        let options = navigation.options();
        Self {
            source_dir: navigation.root().to_path_buf(),
            output_dir: PathBuf::from("dist"),
            extensions: options.extensions.clone(),
            ignore: options.ignore.clone(),
            concurrency: 1,
            registry,
            generator,
            navigation,
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Worker threads; zero lets rayon decide.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Build everything a [`Config`] describes.
    ///
    /// # Errors
    ///
    /// Fails if the styling file cannot be loaded or a plugin name is
    /// unknown with `plugins.strict`.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let styling = Arc::new(match &config.styling_file {
            Some(path) => StylingConfig::load(path)?,
            None => StylingConfig::default(),
        });

        let templates = &config.templates_resolved;
        let engine: Arc<dyn TemplateEngine> = match templates.engine {
            EngineKind::Jinja => Arc::new(
                JinjaEngine::new(&templates.dir)
                    .with_styling(Arc::clone(&styling))
                    .with_cache(cache_for(templates.cache_capacity)),
            ),
            EngineKind::Tera => Arc::new(
                TeraEngine::new(&templates.dir)
                    .with_styling(Arc::clone(&styling))
                    .with_cache(cache_for(templates.cache_capacity)),
            ),
        };
        let mut registry = default_templates(PAGE_EXTENSION);
        for (node_type, template) in &templates.types {
            registry.register(node_type.as_str(), template.as_str());
        }
        let generator = ComponentGenerator::new(engine, Arc::new(registry), styling);

        let mut parsers = ParserRegistry::with_defaults()
            .with_cache(cache_for(config.build.cache_capacity))
            .with_file_options(ParseOptions {
                path: None,
                validate_schema: config.openapi.validate,
                extract_examples: config.openapi.extract_examples,
            });
        for plugin in load_plugins(&config.plugins.enabled, config.plugins.strict)? {
            parsers.add_plugin(plugin);
        }

        let docs = &config.docs_resolved;
        let nav = &config.navigation;
        let navigation = NavigationGenerator::new(
            &docs.source_dir,
            NavigationOptions {
                max_depth: nav.max_depth,
                include_index: nav.include_index,
                sort_by_title: nav.sort_by_title,
                ignore: docs.ignore.clone(),
                extensions: docs.extensions.clone(),
                links: nav
                    .links
                    .iter()
                    .map(|l| NavLink::new(&l.title, &l.url))
                    .collect(),
            },
        );

        Ok(Self::new(parsers, generator, navigation)
            .with_output_dir(&docs.output_dir)
            .with_concurrency(config.build.concurrency))
    }

    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Source documents in build order.
    pub fn discover(&self) -> Result<Vec<PathBuf>, FileSystemError> {
        discover(&self.source_dir, &self.extensions, &self.ignore)
    }

    /// Navigation tree of the source directory.
    pub fn navigation(&self) -> Result<Vec<NavigationItem>, FileSystemError> {
        self.navigation.generate()
    }

    /// Parse and generate every document.
    ///
    /// Documents run on a dedicated pool while navigation is derived
    /// alongside. A failing document is logged and reported in
    /// [`BuildOutput::failures`]; the build fails only when nothing
    /// succeeds. A document whose page path is already taken by an earlier
    /// one (`users.md` and `users.yaml`) fails with
    /// [`DocumentError::OutputConflict`].
    pub fn build(&self) -> Result<BuildOutput, BuildError> {
        let files = self.discover()?;
        if files.is_empty() {
            return Err(BuildError::NoDocuments(self.source_dir.clone()));
        }
        tracing::info!(
            source = %self.source_dir.display(),
            documents = files.len(),
            threads = self.concurrency,
            "building"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()?;
        let (results, navigation) = pool.install(|| {
            rayon::join(
                || {
                    files
                        .par_iter()
                        .map(|path| self.process_file(path))
                        .collect::<Vec<_>>()
                },
                || self.navigation.generate(),
            )
        });
        let navigation = navigation?;

        let mut templates = Vec::with_capacity(results.len());
        let mut components: Vec<ComponentTemplate> = Vec::new();
        let mut failures = Vec::new();
        let mut outputs: HashMap<String, PathBuf> = HashMap::new();
        for (path, result) in files.into_iter().zip(results) {
            let result = result.and_then(|processed| {
                match outputs.get(&processed.page.path) {
                    Some(first) => Err(DocumentError::OutputConflict {
                        output: processed.page.path,
                        first: first.clone(),
                    }),
                    None => {
                        outputs.insert(processed.page.path.clone(), path.clone());
                        Ok(processed)
                    }
                }
            });
            match result {
                Ok(processed) => {
                    templates.push(processed.page);
                    for component in processed.components {
                        if !components.iter().any(|c| c.name == component.name) {
                            components.push(component);
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "document failed");
                    failures.push(DocumentFailure { path, error });
                }
            }
        }

        if templates.is_empty() {
            return Err(BuildError::AllFailed(failures));
        }
        tracing::info!(
            pages = templates.len(),
            failed = failures.len(),
            components = components.len(),
            "build finished"
        );

        Ok(BuildOutput {
            templates,
            components,
            navigation,
            failures,
            content_cache: self.registry.cache_stats(),
            template_cache: self.generator.engine().cache_stats(),
        })
    }

    /// [`build`](Self::build), then hand the pages to `sink`.
    pub fn run(&self, sink: &mut dyn BuildSink) -> Result<BuildOutput, BuildError> {
        let output = self.build()?;
        sink.emit(&self.output_dir, &output.templates)
            .map_err(BuildError::Sink)?;
        Ok(output)
    }

    fn process_file(&self, path: &Path) -> Result<Processed, DocumentError> {
        tracing::debug!(path = %path.display(), "processing");
        let parsed = self.registry.parse_file(path)?;

        let plugins = self.registry.plugins();
        let content = plugins.before_generate(ParsedContent::clone(&parsed), Some(path))?;
        let markup = self.generator.generate_page(&content)?;
        let markup = plugins.after_generate(markup, Some(path))?;
        let components = self.generator.component_templates(&content)?;

        let rel = relative_path(&self.source_dir, &path.with_extension(""));
        let page = ComponentTemplate::page(
            page_symbol(&content.title),
            format!("{rel}.{PAGE_EXTENSION}"),
            markup,
        );
        Ok(Processed { page, components })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source_dir", &self.source_dir)
            .field("output_dir", &self.output_dir)
            .field("concurrency", &self.concurrency)
            .field("plugins", self.registry.plugins())
            .finish_non_exhaustive()
    }
}

/// `<type>.<ext>` for every built-in element type.
#[must_use]
pub fn default_templates(extension: &str) -> TemplateRegistry {
    BUILTIN_TYPES
        .iter()
        .map(|t| (*t, format!("{t}.{extension}")))
        .collect()
}

/// `None` is unbounded, `Some(0)` disables caching.
fn cache_for<V: Clone + Send + 'static>(capacity: Option<usize>) -> Arc<dyn Cache<V>> {
    match capacity {
        Some(0) => Arc::new(NullCache::default()),
        Some(n) => Arc::new(MemoryCache::with_capacity(n)),
        None => Arc::new(MemoryCache::new()),
    }
}
