//! Navigation for Folio sites.
//!
//! [`NavigationGenerator`] scans a source directory and derives a tree of
//! [`NavigationItem`](folio_core::NavigationItem)s:
//!
//! - `index.*` (or `readme.*`) represents its directory
//! - other documents become `page` items
//! - subdirectories become `section` items, pruned when empty
//!
//! [`render_sidebar`] and [`render_navbar`] serialize the tree as nested
//! Markdown-style lists.
//!
//! # Example
//!
//! ```no_run
//! use folio_nav::{NavigationGenerator, NavigationOptions, render_sidebar};
//!
//! let generator = NavigationGenerator::new("docs", NavigationOptions::default());
//! let items = generator.generate()?;
//! print!("{}", render_sidebar(&items));
//! # Ok::<(), folio_core::FileSystemError>(())
//! ```

mod generator;
mod options;
mod render;
mod scanner;
mod url;

pub use generator::NavigationGenerator;
pub use options::{NavLink, NavigationOptions};
pub use render::{render_navbar, render_sidebar};
pub use url::{path_to_url, prettify_name};
