//! Writes generated pages to disk.

use std::fs;
use std::path::Path;

use folio_core::{FileSystemError, FsOperation};
use folio_generator::ComponentTemplate;
use folio_parser::BoxError;
use folio_pipeline::BuildSink;

/// Writes each template's content to `output_dir/<template.path>`.
#[derive(Debug, Default)]
pub(crate) struct DirectorySink {
    written: usize,
}

impl DirectorySink {
    /// Files written so far.
    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl BuildSink for DirectorySink {
    fn emit(&mut self, output_dir: &Path, templates: &[ComponentTemplate]) -> Result<(), BoxError> {
        for template in templates {
            let target = output_dir.join(&template.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| FileSystemError::new(FsOperation::CreateDir, parent, e))?;
            }
            fs::write(&target, &template.content)
                .map_err(|e| FileSystemError::new(FsOperation::Write, &target, e))?;
            tracing::debug!(path = %target.display(), "wrote page");
            self.written += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_writes_nested_pages() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().join("dist");
        let templates = vec![
            ComponentTemplate::page("Home", "index.html", "<p>home</p>\n"),
            ComponentTemplate::page("Users", "api/users.html", "<p>users</p>\n"),
        ];

        let mut sink = DirectorySink::default();
        sink.emit(&out, &templates).unwrap();

        assert_eq!(sink.written(), 2);
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "<p>home</p>\n");
        assert_eq!(
            fs::read_to_string(out.join("api/users.html")).unwrap(),
            "<p>users</p>\n"
        );
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        // A file where the output directory should be.
        let out = temp.path().join("dist");
        fs::write(&out, "").unwrap();

        let templates = vec![ComponentTemplate::page("Home", "index.html", "x")];
        let err = DirectorySink::default().emit(&out, &templates).unwrap_err();
        let err = err.downcast::<FileSystemError>().unwrap();
        assert!(err.to_string().contains("dist"), "{err}");
    }
}
