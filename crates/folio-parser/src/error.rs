//! Parser, plugin and registry errors.

use std::fmt;
use std::path::PathBuf;

use folio_core::FileSystemError;

/// Boxed error returned by plugin hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Semantic category of a parse failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Input is not valid for the declared format.
    Malformed,
    /// Input uses a construct or file type the parser does not handle.
    Unsupported,
    /// Input is well-formed but fails structural validation.
    Validation,
    /// Source could not be read.
    Io,
}

/// Parse failure with format, path and underlying cause.
#[derive(Debug)]
pub struct ParseError {
    /// Semantic error category.
    pub kind: ParseErrorKind,
    /// Format key of the parser that failed (e.g. "markdown").
    pub format: String,
    /// Source path (if known).
    pub path: Option<PathBuf>,
    /// Human-readable description.
    pub message: String,
    source: Option<BoxError>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, format: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            format: format.into(),
            path: None,
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`ParseErrorKind::Malformed`] error.
    #[must_use]
    pub fn malformed(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Malformed, format, message)
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach path context if one is known.
    #[must_use]
    pub fn with_optional_path(self, path: Option<&std::path::Path>) -> Self {
        match path {
            Some(path) => self.with_path(path),
            None => self,
        }
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "[format] Kind: message: source (path: docs/a.md)"
        write!(f, "[{}] ", self.format)?;

        let kind_str = match self.kind {
            ParseErrorKind::Malformed => "Malformed input",
            ParseErrorKind::Unsupported => "Unsupported",
            ParseErrorKind::Validation => "Validation failed",
            ParseErrorKind::Io => "I/O error",
        };
        write!(f, "{kind_str}: {}", self.message)?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Plugin hook interception point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    BeforeParse,
    AfterParse,
    BeforeGenerate,
    AfterGenerate,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeParse => "beforeParse",
            Self::AfterParse => "afterParse",
            Self::BeforeGenerate => "beforeGenerate",
            Self::AfterGenerate => "afterGenerate",
        };
        f.write_str(name)
    }
}

/// A plugin hook returned an error.
#[derive(Debug, thiserror::Error)]
#[error("Plugin '{plugin}' failed in {hook}: {source}")]
pub struct PluginError {
    pub plugin: String,
    pub hook: Hook,
    #[source]
    pub source: BoxError,
}

impl PluginError {
    #[must_use]
    pub fn new(plugin: impl Into<String>, hook: Hook, source: BoxError) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            source,
        }
    }
}

/// Error returned by [`ParserRegistry`](crate::ParserRegistry) operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No parser registered for format '{0}'")]
    NoParserRegistered(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::malformed("markdown", "unterminated front matter")
            .with_path("docs/guide.md");
        assert_eq!(
            err.to_string(),
            "[markdown] Malformed input: unterminated front matter (path: docs/guide.md)"
        );
    }

    #[test]
    fn test_parse_error_source_chain() {
        let io = std::io::Error::other("disk gone");
        let err = ParseError::new(ParseErrorKind::Io, "openapi", "read failed").with_source(io);

        assert!(err.to_string().ends_with("read failed: disk gone"));
        assert!(err.downcast_source::<std::io::Error>().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_plugin_error_names_plugin_and_hook() {
        let err = PluginError::new("toc", Hook::AfterParse, "boom".into());
        assert_eq!(err.to_string(), "Plugin 'toc' failed in afterParse: boom");
    }

    #[test]
    fn test_registry_error_no_parser() {
        let err = RegistryError::NoParserRegistered("rst".to_owned());
        assert_eq!(err.to_string(), "No parser registered for format 'rst'");
    }
}
