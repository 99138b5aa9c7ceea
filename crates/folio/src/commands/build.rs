//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_pipeline::Pipeline;

use crate::error::CliError;
use crate::output::Output;
use crate::sink::DirectorySink;

/// Arguments for the build command.
#[derive(Args, Default)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for generated pages (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// Worker threads (overrides config).
    #[arg(short, long, env = "FOLIO_JOBS")]
    jobs: Option<usize>,
}

impl BuildArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            templates_dir: self.templates_dir,
            concurrency: self.jobs,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let pipeline = Pipeline::from_config(&config)?;

        output.info(&format!("Source: {}", pipeline.source_dir().display()));
        output.info(&format!("Output: {}", pipeline.output_dir().display()));

        let mut sink = DirectorySink::default();
        let result = pipeline.run(&mut sink)?;

        for failure in &result.failures {
            output.warning(&format!("Skipped {failure}"));
        }
        output.detail(&format!(
            "Content cache: {} hits, {} misses",
            result.content_cache.hits, result.content_cache.misses
        ));
        output.detail(&format!(
            "Template cache: {} hits, {} misses",
            result.template_cache.hits, result.template_cache.misses
        ));

        let summary = format!(
            "Built {} pages ({} components) to {}",
            sink.written(),
            result.components.len(),
            pipeline.output_dir().display()
        );
        if result.failures.is_empty() {
            output.success(&summary);
        } else {
            output.warning(&format!("{summary}, {} failed", result.failures.len()));
        }
        Ok(())
    }
}
