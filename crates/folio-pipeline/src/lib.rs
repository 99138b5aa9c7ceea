//! Document build pipeline for Folio.
//!
//! [`Pipeline`] ties the pieces together: discover source documents, parse
//! them through the [`ParserRegistry`](folio_parser::ParserRegistry) (with
//! plugin hooks and the content cache), generate pages with the
//! [`ComponentGenerator`](folio_generator::ComponentGenerator) and derive
//! navigation, all on a dedicated `rayon` pool.
//!
//! The pipeline writes nothing itself; a [`BuildSink`] receives the
//! generated pages.
//!
//! ```no_run
//! use folio_config::Config;
//! use folio_pipeline::Pipeline;
//!
//! let config = Config::load(None, None)?;
//! let output = Pipeline::from_config(&config)?.build()?;
//! for failure in &output.failures {
//!     eprintln!("skipped {failure}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod discovery;
mod error;
mod pipeline;
mod plugins;

pub use discovery::discover;
pub use error::{BuildError, DocumentError, DocumentFailure};
pub use pipeline::{BuildOutput, BuildSink, Pipeline, default_templates};
pub use plugins::{CATALOG, HeadingAnchors, ReadingTime, StripComments, load_plugins};
