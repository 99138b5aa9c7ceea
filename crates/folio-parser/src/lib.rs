//! Format parsers for Folio.
//!
//! Converts source documents into the canonical [`ParsedContent`] tree:
//!
//! - [`MarkdownParser`]: YAML front matter, H1-H3 section tree, assets and links
//! - [`OpenApiParser`]: OpenAPI 3 / Swagger 2 in JSON or YAML
//!
//! [`ParserRegistry`] selects a parser by format key, runs [`Plugin`] hooks
//! around each parse and caches file parses by path and modification time.
//!
//! # Example
//!
//! ```
//! use folio_parser::{ParseOptions, ParserRegistry};
//!
//! let registry = ParserRegistry::with_defaults();
//! let doc = registry
//!     .parse("# Guide\n\n## Install\n", "md", &ParseOptions::default())
//!     .unwrap();
//! assert_eq!(doc.title, "Guide");
//! assert_eq!(doc.sections[0].children.len(), 1);
//! ```
//!
//! [`ParsedContent`]: folio_core::ParsedContent

mod error;
mod frontmatter;
mod links;
mod markdown;
mod openapi;
mod parser;
mod plugin;
mod registry;

pub use error::{BoxError, Hook, ParseError, ParseErrorKind, PluginError, RegistryError};
pub use links::{guess_media, is_external};
pub use markdown::{MarkdownParser, slugify};
pub use openapi::OpenApiParser;
pub use parser::{ParseOptions, Parser};
pub use plugin::{Plugin, PluginChain};
pub use registry::{CachedContent, ParserRegistry};

/// Extract a document title without a full parse.
///
/// Markdown: first H1, else front matter `title`. OpenAPI: `info.title`.
/// Returns `None` for unknown extensions or when no title is present.
#[must_use]
pub fn document_title(source: &str, extension: &str) -> Option<String> {
    match extension.to_ascii_lowercase().as_str() {
        "md" | "markdown" => markdown::extract_title(source),
        "json" | "yaml" | "yml" | "openapi" => openapi::extract_title(source),
        _ => None,
    }
}
