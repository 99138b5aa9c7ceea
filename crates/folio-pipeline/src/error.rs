//! Build errors.

use std::fmt;
use std::path::PathBuf;

use folio_core::FileSystemError;
use folio_generator::GenerateError;
use folio_parser::{BoxError, PluginError, RegistryError};
use folio_template::StylingError;

/// Why one document was left out of the build.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] RegistryError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    /// Another document already generates the same output file.
    #[error("Output {output} is already generated from {}", first.display())]
    OutputConflict { output: String, first: PathBuf },
}

/// A document that failed while the rest of the batch continued.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source path of the document.
    pub path: PathBuf,
    pub error: DocumentError,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Failure of a whole build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
    #[error(transparent)]
    Styling(#[from] StylingError),
    #[error("Unknown plugin '{0}'")]
    UnknownPlugin(String),
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("No documents found in {}", .0.display())]
    NoDocuments(PathBuf),
    /// Every discovered document failed.
    #[error("All {} documents failed:{}", .0.len(), failure_lines(.0))]
    AllFailed(Vec<DocumentFailure>),
    #[error("Failed to emit build output: {0}")]
    Sink(#[source] BoxError),
}

fn failure_lines(failures: &[DocumentFailure]) -> String {
    failures.iter().map(|f| format!("\n  {f}")).collect()
}
