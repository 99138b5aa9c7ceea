//! Configuration management for Folio.
//!
//! Parses `folio.toml` with serde and discovers it in the current directory
//! or its parents. CLI settings are applied during load via [`CliSettings`].
//!
//! ```toml
//! [docs]
//! source_dir = "docs"
//! output_dir = "dist"
//! extensions = ["md", "yaml"]
//! ignore = ["drafts"]
//!
//! [build]
//! concurrency = 8
//! cache_capacity = 512
//!
//! [templates]
//! engine = "jinja"
//! dir = "templates"
//!
//! [templates.types]
//! section = "section.html"
//!
//! [styling]
//! file = "styling.toml"
//!
//! [navigation]
//! max_depth = 3
//! links = [{ title = "GitHub", url = "https://github.com/acme/docs" }]
//!
//! [plugins]
//! enabled = ["heading-anchors"]
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `docs.source_dir`,
//! `docs.output_dir`, `templates.dir`, `styling.file` and navigation link
//! URLs. Relative paths resolve against the config file's directory.

mod expand;

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

const DEFAULT_EXTENSIONS: [&str; 5] = ["md", "markdown", "json", "yaml", "yml"];

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Paths as written in TOML; see `docs_resolved`.
    docs: DocsConfigRaw,
    pub build: BuildConfig,
    templates: TemplatesConfigRaw,
    styling: StylingConfigRaw,
    pub navigation: NavigationConfig,
    pub openapi: OpenApiConfig,
    pub plugins: PluginsConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved templates configuration (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Resolved styling file (set after loading).
    #[serde(skip)]
    pub styling_file: Option<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    extensions: Option<Vec<String>>,
    ignore: Vec<String>,
}

/// Resolved documentation paths and selection.
#[derive(Debug, Clone)]
pub struct DocsConfig {
    /// Source directory scanned for documents.
    pub source_dir: PathBuf,
    /// Directory the generated templates are written to.
    pub output_dir: PathBuf,
    /// Document extensions without the leading dot, lowercase.
    pub extensions: Vec<String>,
    /// Names or source-relative paths to skip.
    pub ignore: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            ignore: Vec::new(),
        }
    }
}

/// Batch build configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Worker threads for per-document parse and generate.
    pub concurrency: usize,
    /// Content cache capacity. `None` is unbounded, `Some(0)` disables it.
    pub cache_capacity: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
            cache_capacity: None,
        }
    }
}

/// Template dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineKind {
    #[default]
    Jinja,
    Tera,
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jinja" | "minijinja" => Ok(Self::Jinja),
            "tera" => Ok(Self::Tera),
            other => Err(ConfigError::Validation(format!(
                "templates.engine must be \"jinja\" or \"tera\", got \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jinja => "jinja",
            Self::Tera => "tera",
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    engine: Option<String>,
    dir: Option<String>,
    cache_capacity: Option<usize>,
    types: BTreeMap<String, String>,
}

/// Resolved template configuration.
#[derive(Debug, Clone)]
pub struct TemplatesConfig {
    pub engine: EngineKind,
    /// Templates root.
    pub dir: PathBuf,
    /// Compiled-template cache capacity. `None` is unbounded, `Some(0)`
    /// disables it.
    pub cache_capacity: Option<usize>,
    /// Element type to template path overrides.
    pub types: BTreeMap<String, String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            dir: PathBuf::from("templates"),
            cache_capacity: None,
            types: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StylingConfigRaw {
    file: Option<String>,
}

/// Navigation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub max_depth: Option<usize>,
    pub include_index: bool,
    pub sort_by_title: bool,
    pub links: Vec<LinkConfig>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_index: true,
            sort_by_title: false,
            links: Vec::new(),
        }
    }
}

/// Extra navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkConfig {
    pub title: String,
    pub url: String,
}

/// OpenAPI parsing options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Reject documents missing `openapi`/`swagger`, `info` or `paths`.
    pub validate: bool,
    /// Collect request and response examples into metadata.
    pub extract_examples: bool,
}

/// Plugin selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Catalog names, in hook order.
    pub enabled: Vec<String>,
    /// Fail on unknown plugin names instead of skipping them.
    pub strict: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.source_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `folio.toml` in the current directory and parents, and
    /// falls back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after path resolution and validated with
    /// the rest of the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text as if it were loaded from `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml_str(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve(config_dir)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(templates_dir) = &settings.templates_dir {
            self.templates_resolved.dir.clone_from(templates_dir);
        }
        if let Some(concurrency) = settings.concurrency {
            self.build.concurrency = concurrency;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Defaults with paths relative to `base`.
    fn default_with_base(base: &Path) -> Self {
        let docs = DocsConfig::default();
        let templates = TemplatesConfig::default();
        Self {
            docs: DocsConfigRaw::default(),
            build: BuildConfig::default(),
            templates: TemplatesConfigRaw::default(),
            styling: StylingConfigRaw::default(),
            navigation: NavigationConfig::default(),
            openapi: OpenApiConfig::default(),
            plugins: PluginsConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join(docs.source_dir),
                output_dir: base.join(docs.output_dir),
                ..docs
            },
            templates_resolved: TemplatesConfig {
                dir: base.join(templates.dir),
                ..templates
            },
            styling_file: None,
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.concurrency == 0 {
            return Err(ConfigError::Validation(
                "build.concurrency must be greater than 0".to_owned(),
            ));
        }
        if self.docs_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "docs.extensions cannot be empty".to_owned(),
            ));
        }
        if self.navigation.max_depth == Some(0) {
            return Err(ConfigError::Validation(
                "navigation.max_depth must be greater than 0".to_owned(),
            ));
        }
        for link in &self.navigation.links {
            if link.title.is_empty() || link.url.is_empty() {
                return Err(ConfigError::Validation(
                    "navigation.links entries need a title and a url".to_owned(),
                ));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.docs.source_dir, "docs.source_dir")?;
        expand::expand_opt(&mut self.docs.output_dir, "docs.output_dir")?;
        expand::expand_opt(&mut self.templates.dir, "templates.dir")?;
        expand::expand_opt(&mut self.styling.file, "styling.file")?;
        for link in &mut self.navigation.links {
            link.url = expand::expand_env(&link.url, "navigation.links.url")?;
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and parse the
    /// engine name.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let docs = DocsConfig::default();
        let resolve = |path: Option<&str>, default: &Path| {
            path.map_or_else(|| config_dir.join(default), |p| config_dir.join(p))
        };

        let extensions = match &self.docs.extensions {
            Some(extensions) => extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            None => docs.extensions,
        };
        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), &docs.source_dir),
            output_dir: resolve(self.docs.output_dir.as_deref(), &docs.output_dir),
            extensions,
            ignore: self.docs.ignore.clone(),
        };

        let engine = match &self.templates.engine {
            Some(name) => name.parse()?,
            None => EngineKind::default(),
        };
        self.templates_resolved = TemplatesConfig {
            engine,
            dir: resolve(
                self.templates.dir.as_deref(),
                &TemplatesConfig::default().dir,
            ),
            cache_capacity: self.templates.cache_capacity,
            types: self.templates.types.clone(),
        };

        self.styling_file = self.styling.file.as_deref().map(|f| config_dir.join(f));
        Ok(())
    }
}
