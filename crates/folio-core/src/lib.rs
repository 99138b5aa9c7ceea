//! Content model for the Folio document pipeline.
//!
//! Every source format is reduced to the same in-memory shape before any
//! rendering happens:
//!
//! - [`ParsedContent`]: one parsed document (title, metadata, section tree,
//!   extracted assets and references)
//! - [`ContentNode`]: a node of the section tree, tagged with an open
//!   string type so plugins can introduce their own element kinds
//! - [`NavigationItem`]: one entry of the derived navigation tree
//! - [`SourceFilter`]: document selection shared by discovery and navigation
//!
//! The content types carry no behavior beyond construction and traversal.
//! They serialize with camelCase keys since templates consume them directly.
//!
//! # Example
//!
//! ```
//! use folio_core::{ContentNode, ParsedContent};
//!
//! let mut doc = ParsedContent::new("Guide");
//! doc.sections.push(ContentNode::section("Install", 1).with_text("Run the installer."));
//! assert_eq!(doc.sections[0].text(), Some("Run the installer."));
//! ```

mod content;
mod error;
mod navigation;
mod source;

pub use content::{
    Asset, AssetKind, ContentNode, Metadata, NodeContent, ParsedContent, Reference,
    ReferenceKind,
};
pub use error::{FileSystemError, FsOperation};
pub use navigation::{NavItemType, NavigationItem};
pub use source::{SourceEntry, SourceFilter, relative_path};
