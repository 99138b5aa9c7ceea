//! Parser registry.
//!
//! Maps format keys (usually file extensions) to [`Parser`]s, runs plugin
//! hooks around every parse, and memoizes file parses in a content cache
//! keyed by `"{path}:{mtime}"`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use folio_cache::{Cache, CacheStats, NullCache};
use folio_core::{FileSystemError, FsOperation, ParsedContent};

use crate::markdown::MarkdownParser;
use crate::openapi::OpenApiParser;
use crate::parser::{ParseOptions, Parser};
use crate::plugin::{Plugin, PluginChain};
use crate::RegistryError;

/// Cached result of a successful file parse (after `afterParse` hooks).
#[derive(Clone, Debug)]
pub struct CachedContent {
    pub content: Arc<ParsedContent>,
    /// Modification time of the source when it was parsed.
    pub source_mtime: SystemTime,
    /// Source size in bytes.
    pub size: u64,
}

/// Registry of parsers by case-insensitive format key.
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn Parser>>,
    plugins: PluginChain,
    cache: Arc<dyn Cache<CachedContent>>,
    file_options: ParseOptions,
}

impl ParserRegistry {
    /// Create an empty registry without caching.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
            plugins: PluginChain::new(),
            cache: Arc::new(NullCache::default()),
            file_options: ParseOptions::default(),
        }
    }

    /// Create a registry with the built-in Markdown and OpenAPI parsers.
    ///
    /// Markdown: `md`, `markdown`. OpenAPI: `json`, `yaml`, `yml`, `openapi`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let markdown: Arc<dyn Parser> = Arc::new(MarkdownParser::new());
        let openapi: Arc<dyn Parser> = Arc::new(OpenApiParser::new());
        for key in ["md", "markdown"] {
            registry.register(key, Arc::clone(&markdown));
        }
        for key in ["json", "yaml", "yml", "openapi"] {
            registry.register(key, Arc::clone(&openapi));
        }
        registry
    }

    /// Use the given content cache for [`parse_file`](Self::parse_file).
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn Cache<CachedContent>>) -> Self {
        self.cache = cache;
        self
    }

    /// Options applied by [`parse_file`](Self::parse_file) (the path is set per file).
    #[must_use]
    pub fn with_file_options(mut self, options: ParseOptions) -> Self {
        self.file_options = options;
        self
    }

    /// Register a parser, replacing any parser already registered for the key.
    pub fn register(&mut self, format: &str, parser: Arc<dyn Parser>) {
        let key = format.to_ascii_lowercase();
        if self.parsers.insert(key, parser).is_some() {
            tracing::debug!(format, "replaced registered parser");
        }
    }

    /// Append a plugin. Hooks run in registration order.
    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        tracing::debug!(plugin = plugin.name(), "registered plugin");
        self.plugins.push(plugin);
    }

    /// Registered plugins.
    #[must_use]
    pub fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    /// Whether a parser is registered for the key.
    #[must_use]
    pub fn supports(&self, format: &str) -> bool {
        self.parsers.contains_key(&format.to_ascii_lowercase())
    }

    /// Registered format keys, sorted.
    #[must_use]
    pub fn formats(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Look up the parser for a format key.
    pub fn get_parser(&self, format: &str) -> Result<Arc<dyn Parser>, RegistryError> {
        self.parsers
            .get(&format.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| RegistryError::NoParserRegistered(format.to_owned()))
    }

    /// Parse source text with plugin hooks.
    ///
    /// `beforeParse` hooks run before the parser is resolved, then the
    /// parser runs, then `afterParse` hooks.
    pub fn parse(
        &self,
        source: &str,
        format: &str,
        options: &ParseOptions,
    ) -> Result<ParsedContent, RegistryError> {
        let path = options.path.as_deref();
        let source = self.plugins.before_parse(source.to_owned(), path)?;
        let parser = self.get_parser(format)?;
        let parsed = parser.parse(&source, options)?;
        Ok(self.plugins.after_parse(parsed, path)?)
    }

    /// Read, parse and cache a file.
    ///
    /// The format key is the file extension. A cached value is reused only
    /// while the file's modification time is unchanged. Failed parses are
    /// never cached.
    pub fn parse_file(&self, path: &Path) -> Result<Arc<ParsedContent>, RegistryError> {
        let format = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        self.get_parser(&format)?;

        let meta = std::fs::metadata(path)
            .map_err(|e| FileSystemError::new(FsOperation::Stat, path, e))?;
        let mtime = meta
            .modified()
            .map_err(|e| FileSystemError::new(FsOperation::Stat, path, e))?;
        let key = cache_key(path, mtime);

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(path = %path.display(), "content cache hit");
            return Ok(cached.content);
        }

        let source = std::fs::read_to_string(path)
            .map_err(|e| FileSystemError::new(FsOperation::Read, path, e))?;
        let options = self.file_options.clone().with_path(path);
        let content = Arc::new(self.parse(&source, &format, &options)?);

        self.cache.set(
            &key,
            CachedContent {
                content: Arc::clone(&content),
                source_mtime: mtime,
                size: meta.len(),
            },
        );
        Ok(content)
    }

    /// Content cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached parse.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(path: &Path, mtime: SystemTime) -> String {
    let nanos = mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}:{nanos}", path.display())
}
