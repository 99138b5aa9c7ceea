//! Format parser trait.

use std::path::{Path, PathBuf};

use folio_core::ParsedContent;

use crate::ParseError;

/// Options passed to every [`Parser::parse`] call.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Source path, used in errors, `metadata.originalPath` and reference sources.
    pub path: Option<PathBuf>,
    /// Run structural validation (OpenAPI only).
    pub validate_schema: bool,
    /// Collect request/response examples into `metadata.examples` (OpenAPI only).
    pub extract_examples: bool,
}

impl ParseOptions {
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Path rendered with forward slashes, or empty.
    pub(crate) fn source_name(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default()
    }
}

/// Converts source text of one format into [`ParsedContent`].
///
/// Implementations are stateless and shared between worker threads.
pub trait Parser: Send + Sync {
    /// Format key used in error messages (e.g. "markdown").
    fn format(&self) -> &str;

    /// Parse source text.
    ///
    /// Never fails for syntactically valid input of the declared format.
    fn parse(&self, source: &str, options: &ParseOptions) -> Result<ParsedContent, ParseError>;
}
